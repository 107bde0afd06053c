use std::fmt::Write;

pub struct MeasureGroup {
    pub audience: &'static str,
    pub measures: [&'static str; 4],
}

pub const REMEDIAL_MEASURES: [MeasureGroup; 4] = [
    MeasureGroup {
        audience: "Residential Areas",
        measures: [
            "Install soundproof windows and doors",
            "Plant trees and create green barriers",
            "Implement and respect quiet hours",
            "Use noise-absorbing materials in home construction",
        ],
    },
    MeasureGroup {
        audience: "Commercial Areas",
        measures: [
            "Use noise-absorbing materials in construction",
            "Regulate delivery times to reduce nighttime noise",
            "Encourage the use of electric vehicles for deliveries",
            "Install sound barriers around noisy equipment",
        ],
    },
    MeasureGroup {
        audience: "Industrial Areas",
        measures: [
            "Install noise barriers around industrial sites",
            "Use quieter machinery and equipment",
            "Implement regular maintenance to reduce equipment noise",
            "Create buffer zones between industrial and residential areas",
        ],
    },
    MeasureGroup {
        audience: "General Measures",
        measures: [
            "Enforce stricter noise regulations",
            "Promote public awareness about noise pollution",
            "Invest in smart city technologies for noise monitoring",
            "Encourage the use of public transportation",
        ],
    },
];

pub const SUCCESS_STORY: &str = "The city of Mumbai has successfully reduced noise pollution in some \
areas by up to 8 dB by implementing low-noise road surfaces, creating quiet zones, and promoting \
electric public transportation.";

/// Markdown body for the measures section. `heading` sets the level of the
/// per-audience headings.
pub fn render_markdown(heading: &str) -> String {
    let mut output = String::new();
    for group in REMEDIAL_MEASURES.iter() {
        let _ = writeln!(output, "{heading} For {}", group.audience);
        for measure in group.measures.iter() {
            let _ = writeln!(output, "- {measure}");
        }
        let _ = writeln!(output);
    }
    let _ = writeln!(output, "> Success story: {SUCCESS_STORY}");
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_every_group() {
        let text = render_markdown("###");
        for group in REMEDIAL_MEASURES.iter() {
            assert!(text.contains(&format!("### For {}", group.audience)));
        }
        assert_eq!(text.lines().filter(|l| l.starts_with("- ")).count(), 16);
        assert!(text.contains("up to 8 dB"));
    }
}
