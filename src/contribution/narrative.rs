use std::collections::BTreeSet;

use super::rules::ResearchType;

const UNSPECIFIED_SUBDOMAINS: &str = "Not clearly specified";

pub fn build_prompt(
    title: &str,
    domains: &[String],
    subdomains: &BTreeSet<String>,
    research_type: ResearchType,
) -> String {
    let subdomains = if subdomains.is_empty() {
        UNSPECIFIED_SUBDOMAINS.to_string()
    } else {
        subdomains.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    };

    format!(
        "You are a senior academic research analyst.\n\
         \n\
         Based ONLY on the title below, infer realistic research insights.\n\
         \n\
         Title:\n{title}\n\
         \n\
         Primary Domains:\n{domains}\n\
         \n\
         Subdomains:\n{subdomains}\n\
         \n\
         Research Type:\n{research_type}\n\
         \n\
         Write ONE professional academic paragraph explaining:\n\
         - objective\n\
         - methodology\n\
         - evaluation\n\
         - innovation\n\
         - impact\n",
        domains = domains.join(", "),
    )
}

/// Deterministic paragraph used whenever the generated one is unavailable.
pub fn fallback_paragraph(title: &str, domains: &[String], research_type: ResearchType) -> String {
    format!(
        "This research appears to investigate {}, situated within {}. \
         It likely represents a {} that develops structured methodologies \
         supported by empirical evaluation. The study may contribute theoretical \
         advancements while also offering practical implementation insights.",
        title.to_lowercase(),
        domains.join(", "),
        research_type.label().to_lowercase(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contents() {
        let domains = vec!["Cybersecurity".to_string()];
        let subs: BTreeSet<String> = ["Cyber Deception".to_string(), "Network Security".to_string()].into();
        let prompt = build_prompt("Honeypots at Scale", &domains, &subs, ResearchType::Experimental);
        assert!(prompt.contains("Title:\nHoneypots at Scale\n"));
        assert!(prompt.contains("Primary Domains:\nCybersecurity\n"));
        assert!(prompt.contains("Subdomains:\nCyber Deception, Network Security\n"));
        assert!(prompt.contains("Research Type:\nExperimental Research\n"));
        assert!(prompt.contains("- methodology"));
    }

    #[test]
    fn test_prompt_without_subdomains() {
        let prompt = build_prompt("X", &["General Research".into()], &BTreeSet::new(), ResearchType::Survey);
        assert!(prompt.contains("Subdomains:\nNot clearly specified\n"));
    }

    #[test]
    fn test_fallback_paragraph() {
        let domains = vec!["Cybersecurity".to_string(), "Artificial Intelligence".to_string()];
        let p = fallback_paragraph("Neural IDS", &domains, ResearchType::ProposedFramework);
        assert!(p.starts_with(
            "This research appears to investigate neural ids, situated within Cybersecurity, Artificial Intelligence. \
             It likely represents a proposed framework / model that"
        ));
        assert!(p.ends_with("practical implementation insights."));
    }
}
