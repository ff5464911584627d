use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use log::{error, info, warn};
use rayon::prelude::*;

use derma_screen_lib::image_io::{
    get_image_files_in_dir, read_input_file, report_name, save_image, source_name,
};
use derma_screen_lib::output::{write_json_report, write_summary_csv, write_text_report, BatchEntry};
use derma_screen_lib::preprocessing::preprocess_image;
use derma_screen_lib::{Config, Language, Result, ScreeningResult, SkinScreener};

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about = "DermaScreen - visual skin screening reports")]
struct Args {
    /// Path to input photo or directory
    #[clap(short, long)]
    input: Option<String>,

    /// Path to output directory
    #[clap(short, long)]
    output: Option<String>,

    /// Path to configuration file
    #[clap(short, long, default_value = "config.toml")]
    config: String,

    /// Report language tag (overwrites config)
    #[clap(short, long)]
    language: Option<String>,

    /// Enable debug logging and save enhanced working images
    #[clap(short, long)]
    debug: bool,

    /// Analyse every photo independently, without trend tracking
    #[clap(long)]
    no_history: bool,
}

/// One analysed photo in the batch
struct Analysed {
    /// Path under the input root, as listed in the summary
    source: String,
    /// Base path of the report files under the output directory
    report_name: String,
    outcome: Result<ScreeningResult>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_filter));

    let mut config = if Path::new(&args.config).exists() {
        Config::from_file(&args.config)?
    } else {
        warn!("Config file {} not found, using defaults", args.config);
        Config::default()
    };

    if let Some(input) = args.input.clone() {
        config.input_path = input;
    }

    if let Some(output) = args.output.clone() {
        config.output_base_dir = output;
    }

    if let Some(language) = args.language.clone() {
        config.language = language;
    }

    if args.no_history {
        config.track_history = false;
    }

    config.validate().context("invalid configuration")?;

    let start_time = Instant::now();
    let language = config.language();
    let output_base = PathBuf::from(&config.output_base_dir);

    let input_path = PathBuf::from(&config.input_path);
    let (files, root) = if input_path.is_file() {
        let root = input_path.parent().map(Path::to_path_buf).unwrap_or_default();
        (vec![input_path], root)
    } else if input_path.is_dir() {
        let files = get_image_files_in_dir(&input_path)?;
        info!("Found {} photos in {}", files.len(), input_path.display());
        (files, input_path)
    } else {
        bail!("input path {} is neither a file nor a directory", input_path.display());
    };

    // Analyses are independent; history is applied afterwards in path order
    let stateless = SkinScreener::without_history();
    let analyse =
        |path: &PathBuf| analyse_file(path, &root, &stateless, language, &output_base, args.debug);
    let analysed: Vec<Analysed> = if config.use_parallel {
        files.par_iter().map(analyse).collect()
    } else {
        files.iter().map(analyse).collect()
    };

    let session = SkinScreener::new();
    let analysed: Vec<Analysed> = analysed
        .into_iter()
        .map(|entry| {
            if !config.track_history {
                return entry;
            }
            Analysed {
                source: entry.source,
                report_name: entry.report_name,
                outcome: entry.outcome.map(|result| session.finish(result.report)),
            }
        })
        .collect();

    let mut rejected = 0;
    for entry in &analysed {
        match &entry.outcome {
            Ok(result) => {
                if config.write_text_reports {
                    write_text_report(result, &output_base, &entry.report_name)?;
                }
                if config.write_json_reports {
                    write_json_report(result, &output_base, &entry.report_name)?;
                }
            }
            Err(err) => {
                rejected += 1;
                error!("{}: {} ({})", entry.source, err, err.user_message());
            }
        }
    }

    if config.write_summary_csv {
        let entries: Vec<BatchEntry> = analysed
            .iter()
            .map(|entry| BatchEntry {
                filename: &entry.source,
                outcome: &entry.outcome,
            })
            .collect();
        let path = write_summary_csv(&entries, &output_base)?;
        info!("Summary written to {}", path.display());
    }

    info!(
        "Screened {} photo(s), {} rejected, in {:.2} seconds",
        analysed.len(),
        rejected,
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}

fn analyse_file(
    path: &Path,
    root: &Path,
    screener: &SkinScreener,
    language: Language,
    output_base: &Path,
    debug: bool,
) -> Analysed {
    info!("Processing: {}", path.display());

    let source = source_name(path, root).to_string_lossy().into_owned();
    let report_name = report_name(path, root).to_string_lossy().into_owned();

    let outcome = read_input_file(path).and_then(|input| {
        let result = screener.analyze(&input.bytes, input.content_type, language)?;
        if debug {
            let debug_path = output_base
                .join("debug")
                .join(format!("{}_enhanced.png", report_name));
            let saved = preprocess_image(&input.bytes)
                .and_then(|prepared| save_image(&prepared.enhanced, &debug_path));
            if let Err(e) = saved {
                warn!("{}: could not save debug image: {}", source, e);
            }
        }
        Ok(result)
    });

    Analysed {
        source,
        report_name,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, Rgb, RgbImage};
    use std::fs;

    #[test]
    fn failed_debug_save_keeps_the_analysis() {
        let dir = std::env::temp_dir().join(format!("derma_screen_debug_{}", std::process::id()));
        let photos = dir.join("photos");
        fs::create_dir_all(&photos).unwrap();

        let photo = photos.join("arm.jpg");
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(RgbImage::from_pixel(200, 200, Rgb([128, 128, 128])))
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageOutputFormat::Jpeg(100))
            .unwrap();
        fs::write(&photo, bytes).unwrap();

        // A regular file where the output directory should be
        let blocked = dir.join("out");
        fs::write(&blocked, b"").unwrap();

        let screener = SkinScreener::without_history();
        let analysed = analyse_file(&photo, &photos, &screener, Language::English, &blocked, true);

        assert_eq!(analysed.source, "arm.jpg");
        assert_eq!(analysed.report_name, "arm_jpg");
        assert!(analysed.outcome.is_ok());

        fs::remove_dir_all(&dir).ok();
    }
}
