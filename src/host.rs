/// Domains whose feeds get interrupted. Subdomains match too.
pub const TARGET_DOMAINS: [&str; 3] = ["bilibili.com", "zhihu.com", "xiaohongshu.com"];

/// True when `hostname` equals one of [`TARGET_DOMAINS`] or is a subdomain of one.
pub fn is_target_host(hostname: &str) -> bool {
    let host = hostname.trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() {
        return false;
    }

    TARGET_DOMAINS.iter().any(|domain| {
        host == *domain
            || host
                .strip_suffix(domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}
