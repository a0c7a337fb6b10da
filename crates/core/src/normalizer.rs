pub use providers::NormalizationProfile;

/// Collapse every whitespace run to a single space and trim both ends,
/// lower-casing afterwards when the profile asks for it.
pub fn normalize(text: &str, profile: NormalizationProfile) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match profile {
        NormalizationProfile::CasePreserving => collapsed,
        NormalizationProfile::LowerCase => collapsed.to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILES: [NormalizationProfile; 2] = [
        NormalizationProfile::CasePreserving,
        NormalizationProfile::LowerCase,
    ];

    #[test]
    fn collapses_mixed_whitespace() {
        assert_eq!(
            normalize("  The\tcat \n\n sat\r\non  the mat ", NormalizationProfile::CasePreserving),
            "The cat sat on the mat"
        );
    }

    #[test]
    fn lower_case_profile_folds_case() {
        assert_eq!(
            normalize(" Quantum  ENTANGLEMENT ", NormalizationProfile::LowerCase),
            "quantum entanglement"
        );
    }

    #[test]
    fn whitespace_only_becomes_empty() {
        for profile in PROFILES {
            assert_eq!(normalize(" \t\n\u{00a0} ", profile), "");
            assert_eq!(normalize("", profile), "");
        }
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "plain",
            "  leading and trailing  ",
            "tabs\tand\nnewlines\r\n",
            "MiXeD CaSe\u{2003}em space",
            "İstanbul ΣΊΣΥΦΟΣ",
            "already normal text",
            "",
        ];
        for profile in PROFILES {
            for sample in samples {
                let once = normalize(sample, profile);
                assert_eq!(normalize(&once, profile), once, "{sample:?} with {profile:?}");
            }
        }
    }
}
