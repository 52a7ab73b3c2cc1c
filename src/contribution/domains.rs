use std::collections::BTreeSet;

use crate::text::normalize_for_matching;

/// Returned in place of a real domain when nothing matches.
pub const GENERAL_RESEARCH: &str = "General Research";

pub struct Subdomain {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

pub struct Domain {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub subdomains: &'static [Subdomain],
}

/// Known domains in declaration order. Ties in score keep this order.
pub const DOMAINS: &[Domain] = &[
    Domain {
        name: "Artificial Intelligence",
        keywords: &["ai", "neural", "learning", "deep", "transformer", "ml", "intelligent"],
        subdomains: &[
            Subdomain {
                name: "Machine Learning",
                keywords: &["classification", "regression", "supervised", "unsupervised"],
            },
            Subdomain {
                name: "Deep Learning",
                keywords: &["cnn", "rnn", "lstm", "gan", "transformer"],
            },
            Subdomain {
                name: "Computer Vision",
                keywords: &["image", "vision", "object detection", "segmentation"],
            },
            Subdomain {
                name: "Natural Language Processing",
                keywords: &["language", "text", "bert", "llm", "chatbot"],
            },
            Subdomain {
                name: "Reinforcement Learning",
                keywords: &["reinforcement", "policy", "reward", "agent"],
            },
        ],
    },
    Domain {
        name: "Cybersecurity",
        keywords: &["attack", "security", "malware", "intrusion", "threat", "honeypot", "cyber"],
        subdomains: &[
            Subdomain {
                name: "Network Security",
                keywords: &["firewall", "ids", "ips", "network intrusion"],
            },
            Subdomain {
                name: "Cryptography",
                keywords: &["encryption", "cipher", "rsa", "aes"],
            },
            Subdomain {
                name: "Malware Analysis",
                keywords: &["trojan", "ransomware", "exploit"],
            },
            Subdomain {
                name: "Digital Forensics",
                keywords: &["forensic", "investigation", "evidence"],
            },
            Subdomain {
                name: "Cyber Deception",
                keywords: &["honeypot", "deception", "trap"],
            },
        ],
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainMatch {
    pub domains: Vec<String>,
    pub subdomains: BTreeSet<String>,
}

/// Score every domain by keyword substring hits on the normalized title.
/// Matching is substring-based, so short keywords like "ai" also hit inside
/// longer words.
pub fn infer_domains(title: &str) -> DomainMatch {
    let t = normalize_for_matching(title);

    let mut scored: Vec<(&Domain, usize)> = Vec::new();
    let mut subdomains = BTreeSet::new();

    for domain in DOMAINS {
        let score = domain.keywords.iter().filter(|k| t.contains(*k)).count();
        if score == 0 {
            continue;
        }
        scored.push((domain, score));
        for sub in domain.subdomains {
            if sub.keywords.iter().any(|k| t.contains(k)) {
                subdomains.insert(sub.name.to_string());
            }
        }
    }

    if scored.is_empty() {
        return DomainMatch {
            domains: vec![GENERAL_RESEARCH.to_string()],
            subdomains: BTreeSet::new(),
        };
    }

    // sort_by is stable
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    DomainMatch {
        domains: scored.into_iter().map(|(d, _)| d.name.to_string()).collect(),
        subdomains,
    }
}
