//! Static proxy / user-agent assignment.
//!
//! Account `i` is paired with `proxies[i mod p]` and `user_agents[i mod u]`
//! once at startup. The pairing never changes for the lifetime of the run and
//! is never re-balanced when a proxy fails.

/// Proxy and user-agent picked for one account.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment<'a> {
    pub proxy: Option<&'a str>,
    pub user_agent: Option<&'a str>,
}

/// Round-robin pick: `items[index mod len]`, or `None` for an empty list.
pub fn pick<T: AsRef<str>>(items: &[T], index: usize) -> Option<&str> {
    if items.is_empty() {
        None
    } else {
        Some(items[index % items.len()].as_ref())
    }
}

/// Compute the assignment for account `index`.
pub fn assign<'a>(
    proxies: &'a [String],
    user_agents: &'a [String],
    index: usize,
) -> Assignment<'a> {
    Assignment {
        proxy: pick(proxies, index),
        user_agent: pick(user_agents, index),
    }
}
