//! Text rendering for container error messages.
//!
//! Type names coming from [`std::any::type_name`] are long and
//! path-qualified; these helpers turn them into something a person can
//! scan in a terminal.

/// Joins a requirement chain with arrows, outermost first.
///
/// # Examples
/// ```
/// use vial_support::rendering::render_chain;
///
/// let chain = ["UserService", "UserRepository", "Database"];
/// assert_eq!(render_chain(&chain), "UserService → UserRepository → Database");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    let mut rendered = String::new();
    for (i, entry) in chain.iter().enumerate() {
        if i > 0 {
            rendered.push_str(" → ");
        }
        rendered.push_str(entry.as_ref());
    }
    rendered
}

/// Strips module paths from every path segment of a type name.
///
/// ```
/// use vial_support::rendering::shorten_type_name;
///
/// assert_eq!(shorten_type_name("my_app::services::UserService"), "UserService");
/// assert_eq!(
///     shorten_type_name("alloc::sync::Arc<dyn my_app::traits::Logger>"),
///     "Arc<dyn Logger>"
/// );
/// assert_eq!(
///     shorten_type_name("core::option::Option<&[my_app::Row]>"),
///     "Option<&[Row]>"
/// );
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut shortened = String::with_capacity(full_name.len());
    let mut segment = String::new();
    let mut chars = full_name.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == ':' && chars.peek() == Some(&':') {
            // `a::b` keeps only what follows the last `::`
            chars.next();
            segment.clear();
        } else if ch.is_alphanumeric() || ch == '_' {
            segment.push(ch);
        } else {
            shortened.push_str(&segment);
            segment.clear();
            shortened.push(ch);
        }
    }

    shortened.push_str(&segment);
    shortened
}

/// Picks up to `max` names from `available` that resemble `requested`.
///
/// Full-name containment ranks first, then short-name containment, then
/// a shared prefix of at least three characters on the short names.
pub fn suggest_similar(requested: &str, available: &[&str], max: usize) -> Vec<String> {
    let requested_full = requested.to_lowercase();
    let requested_short = shorten_type_name(requested).to_lowercase();

    let mut scored: Vec<(usize, &str)> = available
        .iter()
        .filter(|name| **name != requested)
        .filter_map(|&name| {
            let full = name.to_lowercase();
            let short = shorten_type_name(name).to_lowercase();

            let score = if full.contains(&requested_full) || requested_full.contains(&full) {
                100
            } else if short.contains(&requested_short) || requested_short.contains(&short) {
                80
            } else {
                let prefix = short
                    .chars()
                    .zip(requested_short.chars())
                    .take_while(|(a, b)| a == b)
                    .count();
                if prefix < 3 {
                    return None;
                }
                prefix * 10
            };
            Some((score, name))
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(max)
        .map(|(_, name)| name.to_string())
        .collect()
}
