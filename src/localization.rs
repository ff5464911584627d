// src/localization.rs - Language tags and the (template, language) text table

use serde::{Deserialize, Serialize};

/// Languages the report text is available in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
}

impl Language {
    /// Parse a language tag; unknown tags fall back to English
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "hi" | "hindi" => Language::Hindi,
            _ => Language::English,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
        }
    }
}

/// Single pieces of localized text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    AnalysisResultsHeading,
    NoConcernsDetected,
    ContinueGeneralCare,
    SeverityLevelLabel,
    ConcernsDetected,
    ConfidenceLabel,
    DermatologistReferral,
    TrendWorsening,
    TrendImproving,
    TrendStable,
    ConfidenceNoFindings,
    ConfidenceLowModerate,
    ConfidenceModerate,
    ConfidenceModerateHigh,
    Disclaimer,
    CaptureInstructions,
}

/// Ordered groups of localized lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSet {
    UrgentCare,
    RecommendedCare,
    GeneralCare,
    NextStepsHigh,
    NextStepsMedium,
    NextStepsRoutine,
}

pub fn text(template: Template, language: Language) -> &'static str {
    use Language::*;
    use Template::*;

    match (template, language) {
        (AnalysisResultsHeading, _) => "🔬 ANALYSIS RESULTS:",
        (NoConcernsDetected, English) => "✅ No specific concerns detected",
        (NoConcernsDetected, Hindi) => "✅ Koi specific concern detect nahi hua",
        (ContinueGeneralCare, English) => "📋 Continue with general skin care",
        (ContinueGeneralCare, Hindi) => "📋 General skin care follow karein",
        (SeverityLevelLabel, _) => "Severity Level",
        (ConcernsDetected, English) => "potential concern(s) detected",
        (ConcernsDetected, Hindi) => "sambhavit concern detect hue",
        (ConfidenceLabel, _) => "Confidence",
        (DermatologistReferral, English) => {
            "URGENT: Dark or irregular moles should be checked by a dermatologist immediately"
        }
        (DermatologistReferral, Hindi) => {
            "URGENT: Dark ya irregular moles ko turant dermatologist se check karwayein"
        }
        (TrendWorsening, English) => {
            "Condition appears to be worsening. Seek medical attention immediately."
        }
        (TrendWorsening, Hindi) => "Condition worsen hoti dikh rahi hai. Turant doctor se milein.",
        (TrendImproving, English) => {
            "Condition shows signs of improvement. Continue current treatment."
        }
        (TrendImproving, Hindi) => {
            "Condition mein sudhar dikh raha hai. Current treatment continue karein."
        }
        (TrendStable, English) => "Condition appears stable. Continue monitoring.",
        (TrendStable, Hindi) => "Condition stable lag rahi hai. Monitoring continue karein.",
        (ConfidenceNoFindings, English) => "low - no specific conditions detected",
        (ConfidenceNoFindings, Hindi) => "low - koi specific condition detect nahi hui",
        (ConfidenceLowModerate, English) => "low-moderate (visual analysis only)",
        (ConfidenceLowModerate, Hindi) => "low-moderate (sirf visual analysis)",
        (ConfidenceModerate, English) => "moderate (visual analysis only)",
        (ConfidenceModerate, Hindi) => "moderate (sirf visual analysis)",
        (ConfidenceModerateHigh, English) => "moderate-high (visual analysis only)",
        (ConfidenceModerateHigh, Hindi) => "moderate-high (sirf visual analysis)",
        (Disclaimer, English) => {
            "⚠️ IMPORTANT DISCLAIMER:\n\
             This is an automated image analysis and is NOT a replacement for professional medical diagnosis.\n\
             Please consult a qualified dermatologist or doctor for accurate diagnosis.\n\
             Seek immediate medical help in case of emergency."
        }
        (Disclaimer, Hindi) => {
            "⚠️ IMPORTANT DISCLAIMER:\n\
             Yeh automated image analysis hai aur professional medical diagnosis ka replacement NAHI hai.\n\
             Accurate diagnosis ke liye qualified dermatologist ya doctor se milein.\n\
             Emergency mein turant medical help lein."
        }
        (CaptureInstructions, English) => {
            "📸 IMAGE ANALYSIS INSTRUCTIONS:\n\
             \n\
             Before sending image:\n\
             1. ✅ Take a clear photo of the affected area\n\
             2. ✅ Ensure good lighting\n\
             3. ✅ Photo should be in focus\n\
             4. ✅ Show the area in close-up\n\
             5. ✅ Multiple angles are helpful\n\
             \n\
             Supported formats: JPG, PNG, WEBP\n\
             Maximum size: 10MB\n\
             \n\
             After sending the image, you will receive basic guidance.\n\
             However, please consult a doctor for professional diagnosis."
        }
        (CaptureInstructions, Hindi) => {
            "📸 IMAGE ANALYSIS INSTRUCTIONS:\n\
             \n\
             Image bhejne se pehle:\n\
             1. ✅ Affected area ka clear photo lein\n\
             2. ✅ Achhe lighting mein photo lein\n\
             3. ✅ Photo focus mein hona chahiye\n\
             4. ✅ Area ko close-up se dikhayein\n\
             5. ✅ Multiple angles se photo helpful hai\n\
             \n\
             Supported formats: JPG, PNG, WEBP\n\
             Maximum size: 10MB\n\
             \n\
             Image bhejne ke baad aapko basic guidance milegi.\n\
             But professional diagnosis ke liye doctor ko zaroor dikhaayein."
        }
    }
}

pub fn lines(set: LineSet, language: Language) -> &'static [&'static str] {
    use Language::*;
    use LineSet::*;

    match (set, language) {
        (UrgentCare, English) => &[
            "🚨 URGENT ACTION REQUIRED:",
            "• Seek immediate medical attention",
            "• Visit emergency if symptoms worsen",
            "• Avoid self-medication",
        ],
        (UrgentCare, Hindi) => &[
            "🚨 URGENT ACTION REQUIRED:",
            "• Immediately doctor se milein",
            "• Emergency mein hospital jaayein",
            "• Self-medication avoid karein",
        ],
        (RecommendedCare, English) => &[
            "⚠️ RECOMMENDED ACTIONS:",
            "• Consult a dermatologist within 1-2 days",
            "• Keep the affected area clean and dry",
            "• Avoid applying anything without medical advice",
        ],
        (RecommendedCare, Hindi) => &[
            "⚠️ RECOMMENDED ACTIONS:",
            "• 1-2 din mein dermatologist ko dikhayein",
            "• Affected area ko clean aur dry rakhein",
            "• Doctor ki advice bina medicine na lein",
        ],
        (GeneralCare, English) => &[
            "📋 GENERAL CARE:",
            "• Keep area clean and dry",
            "• Avoid tight or irritating clothing",
            "• Monitor for changes and consult if worsens",
        ],
        (GeneralCare, Hindi) => &[
            "📋 GENERAL CARE:",
            "• Area ko saaf aur sukha rakhein",
            "• Kharab kapde avoid karein",
            "• Agar condition worsen ho toh doctor se milein",
        ],
        (NextStepsHigh, English) => &[
            "1. Schedule immediate doctor appointment",
            "2. Show these results to your doctor",
            "3. Monitor for any changes",
            "4. Go to emergency if symptoms worsen",
        ],
        (NextStepsHigh, Hindi) => &[
            "1. Turant doctor se appointment lein",
            "2. In results ko doctor ko dikhayein",
            "3. Koi bhi changes monitor karein",
            "4. Emergency mein 102 ya nearest hospital jaayein",
        ],
        (NextStepsMedium, English) => &[
            "1. Schedule dermatologist appointment within 24-48 hours",
            "2. Save this image and analysis report",
            "3. Track daily changes",
            "4. Seek immediate help if condition worsens",
        ],
        (NextStepsMedium, Hindi) => &[
            "1. 24-48 ghante mein dermatologist se appointment lein",
            "2. Image aur analysis report save karein",
            "3. Daily changes track karein",
            "4. Agar worsen ho toh immediately help lein",
        ],
        (NextStepsRoutine, English) => &[
            "1. Continue general skin care routine",
            "2. Monitor for changes",
            "3. Consult doctor if no improvement in 3-4 days",
            "4. Protect the affected area",
        ],
        (NextStepsRoutine, Hindi) => &[
            "1. General skin care routine follow karein",
            "2. Changes monitor karein",
            "3. Agar 3-4 din mein theek na ho toh doctor se milein",
            "4. Affected area ko protect karein",
        ],
    }
}

/// How to photograph an affected area for analysis
pub fn capture_instructions(language: Language) -> &'static str {
    text(Template::CaptureInstructions, language)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_parse_with_english_fallback() {
        assert_eq!(Language::from_tag("hi"), Language::Hindi);
        assert_eq!(Language::from_tag(" Hindi "), Language::Hindi);
        assert_eq!(Language::from_tag("EN"), Language::English);
        assert_eq!(Language::from_tag("ta"), Language::English);
        assert_eq!(Language::from_tag(""), Language::English);
    }

    #[test]
    fn disclaimer_differs_by_language() {
        let en = text(Template::Disclaimer, Language::English);
        let hi = text(Template::Disclaimer, Language::Hindi);
        assert_ne!(en, hi);
        assert!(en.contains("NOT a replacement"));
        assert!(hi.contains("NAHI"));
    }

    #[test]
    fn line_continuations_keep_lines_flush() {
        let disclaimer = text(Template::Disclaimer, Language::English);
        assert!(disclaimer.lines().all(|line| !line.starts_with(' ')));
        assert_eq!(disclaimer.lines().count(), 4);
    }

    #[test]
    fn every_line_set_has_four_entries_in_both_languages() {
        let sets = [
            LineSet::UrgentCare,
            LineSet::RecommendedCare,
            LineSet::GeneralCare,
            LineSet::NextStepsHigh,
            LineSet::NextStepsMedium,
            LineSet::NextStepsRoutine,
        ];
        for set in sets {
            assert_eq!(lines(set, Language::English).len(), 4, "{:?}", set);
            assert_eq!(lines(set, Language::Hindi).len(), 4, "{:?}", set);
        }
    }

    #[test]
    fn capture_instructions_name_the_limits() {
        for language in [Language::English, Language::Hindi] {
            let instructions = capture_instructions(language);
            assert!(instructions.contains("JPG, PNG, WEBP"));
            assert!(instructions.contains("10MB"));
        }
    }
}
