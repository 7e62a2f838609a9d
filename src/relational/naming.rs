//! Table naming chain.
//!
//! Names are built as a pure pipeline over segments:
//! concatenate, elide the overlap between the accumulated name and the next
//! segment, prefix the role name, and finally hand the segments to the
//! identifier guard.

/// Length of the longest word-aligned overlap between the end of
/// `accumulated` and the start of `next`.
///
/// The overlap must start on an uppercase letter and be followed in `next` by
/// another uppercase letter, so only whole words are elided. `next` is never
/// consumed entirely.
pub fn overlap(accumulated: &str, next: &str) -> usize {
    let max = accumulated.len().min(next.len().saturating_sub(1));
    (1..=max)
        .rev()
        .find(|&k| {
            next.is_char_boundary(k)
                && accumulated.ends_with(&next[..k])
                && next[..k].starts_with(|c: char| c.is_ascii_uppercase())
                && next[k..].starts_with(|c: char| c.is_ascii_uppercase())
        })
        .unwrap_or(0)
}

/// Join `next` onto `accumulated` without duplicating their overlap.
pub fn elide_overlap(accumulated: &str, next: &str) -> String {
    let k = overlap(accumulated, next);
    format!("{}{}", &accumulated[..accumulated.len() - k], next)
}

/// The segment a property contributes: its role name followed by its name.
pub fn role_prefixed(context: &str, name: &str) -> String {
    format!("{}{}", context, name)
}

/// The segments of a table name, from the nearest top-level entity down.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameChain {
    segments: Vec<String>,
}

impl NameChain {
    pub fn root(name: &str) -> Self {
        Self {
            segments: vec![name.to_string()],
        }
    }

    pub fn from_segments(segments: &[String]) -> Self {
        Self {
            segments: segments.to_vec(),
        }
    }

    /// Extend the chain with a property's segment.
    ///
    /// Without a role name the property name is elided against the chain; a
    /// role name separates the two so nothing is elided.
    pub fn push(&self, context: &str, name: &str) -> Self {
        let mut segments = self.segments.clone();
        if context.is_empty() {
            let mut k = overlap(&self.full_name(), name);
            while k > 0 {
                let Some(last) = segments.last_mut() else { break };
                if last.len() <= k {
                    k -= last.len();
                    segments.pop();
                } else {
                    last.truncate(last.len() - k);
                    k = 0;
                }
            }
        }
        segments.push(role_prefixed(context, name));
        Self { segments }
    }

    /// Append a literal suffix segment such as `Extension`.
    pub fn suffixed(&self, suffix: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(suffix.to_string());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn full_name(&self) -> String {
        self.segments.concat()
    }
}
