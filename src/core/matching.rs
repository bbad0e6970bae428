use crate::utils::error::Result;
use url::Url;

/// 取出網址的主機名稱：小寫並去掉開頭的 `www.`
///
/// 沒有 scheme 的網址（例如 `example.com/path`）視為 `http://`。
/// 沒有主機的網址回傳 `Ok(None)`。
pub fn normalize_domain(link: &str) -> Result<Option<String>> {
    let link = link.trim();
    if link.is_empty() {
        return Ok(None);
    }

    let url = match Url::parse(link) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("http://{}", link))?,
        Err(e) => return Err(e.into()),
    };

    let host = match url.host_str() {
        Some(host) if !host.is_empty() => host.to_ascii_lowercase(),
        _ => return Ok(None),
    };

    let host = host.strip_prefix("www.").map(str::to_string).unwrap_or(host);
    Ok(Some(host))
}

/// 雙向子字串比對。`target` 需已是小寫。
pub fn domain_matches(target: &str, domain: &str) -> bool {
    if target.is_empty() || domain.is_empty() {
        return false;
    }
    domain.contains(target) || target.contains(domain)
}

/// 目標網域，整次執行不變
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDomain {
    domain: String,
}

impl TargetDomain {
    pub fn new(domain: &str) -> Self {
        let domain = domain.trim().to_ascii_lowercase();
        let domain = domain
            .strip_prefix("www.")
            .map(str::to_string)
            .unwrap_or(domain);
        Self { domain }
    }

    pub fn as_str(&self) -> &str {
        &self.domain
    }

    /// 網址的主機是否屬於目標網域
    pub fn matches_link(&self, link: &str) -> Result<bool> {
        Ok(normalize_domain(link)?
            .map(|domain| domain_matches(&self.domain, &domain))
            .unwrap_or(false))
    }
}
