//! Job-ad detection — spots pasted job advertisements in user messages so the
//! generator can tailor the draft toward them.

/// Phrases that rarely appear in someone describing their own career but are
/// staples of job advertisements.
const JOB_AD_MARKERS: &[&str] = &[
    "requirements",
    "responsibilities",
    "qualifications",
    "we are looking for",
    "we're looking for",
    "you will",
    "must have",
    "nice to have",
    "what you'll do",
    "about the role",
    "job description",
    "the ideal candidate",
    "years of experience",
];

/// Distinct markers a message needs before it counts as a job ad.
const MIN_MARKERS: usize = 2;

pub fn looks_like_job_ad(text: &str) -> bool {
    let lowered = text.to_lowercase();
    JOB_AD_MARKERS
        .iter()
        .filter(|marker| lowered.contains(*marker))
        .take(MIN_MARKERS)
        .count()
        >= MIN_MARKERS
}

#[cfg(test)]
mod tests {
    use super::*;

    const FINANCE_AD: &str = r#"
        Senior Financial Analyst — Corporate FP&A
        We are looking for an analyst to own monthly forecasting.
        Responsibilities: build driver-based models, partner with business units.
        Requirements: 5+ years of experience in FP&A, advanced Excel, SQL.
        Nice to have: Power BI.
    "#;

    #[test]
    fn test_detects_job_ad() {
        assert!(looks_like_job_ad(FINANCE_AD));
    }

    #[test]
    fn test_plain_career_statement_is_not_job_ad() {
        assert!(!looks_like_job_ad(
            "I'm a senior analyst with eight years in corporate finance."
        ));
    }

    #[test]
    fn test_single_marker_is_not_enough() {
        assert!(!looks_like_job_ad(
            "One of my responsibilities was the quarterly close."
        ));
    }
}
