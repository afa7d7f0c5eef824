/// Column argument accepted by every analyzer operation.
///
/// Either a comma-delimited string (`"BTC,ETH"`) or an explicit list; both
/// are normalized into the same ordered list of names before any computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns(Vec<String>);

impl Columns {
    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

fn normalize_name(name: &str) -> Option<String> {
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn split_delimited(text: &str) -> Vec<String> {
    text.split(',').filter_map(normalize_name).collect()
}

impl From<&str> for Columns {
    fn from(text: &str) -> Self {
        Columns(split_delimited(text))
    }
}

impl From<String> for Columns {
    fn from(text: String) -> Self {
        Columns(split_delimited(&text))
    }
}

impl From<&String> for Columns {
    fn from(text: &String) -> Self {
        Columns(split_delimited(text))
    }
}

impl From<Vec<String>> for Columns {
    fn from(names: Vec<String>) -> Self {
        Columns(names.iter().filter_map(|n| normalize_name(n)).collect())
    }
}

impl From<&[String]> for Columns {
    fn from(names: &[String]) -> Self {
        Columns(names.iter().filter_map(|n| normalize_name(n)).collect())
    }
}

impl From<Vec<&str>> for Columns {
    fn from(names: Vec<&str>) -> Self {
        Columns(names.into_iter().filter_map(normalize_name).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Columns {
    fn from(names: [&str; N]) -> Self {
        Columns(names.into_iter().filter_map(normalize_name).collect())
    }
}

impl From<&Columns> for Columns {
    fn from(columns: &Columns) -> Self {
        columns.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_and_list_normalize_to_same_columns() {
        let from_text = Columns::from("BTC,ETH");
        let from_list = Columns::from(["BTC", "ETH"]);
        assert_eq!(from_text, from_list);
        assert_eq!(from_text.names(), &["BTC".to_string(), "ETH".to_string()]);
    }

    #[test]
    fn trims_whitespace_and_skips_empty_segments() {
        let columns = Columns::from(" BTC , ,ETH,");
        assert_eq!(columns.iter().collect::<Vec<_>>(), vec!["BTC", "ETH"]);
    }

    #[test]
    fn preserves_order() {
        let columns = Columns::from(vec!["ETH".to_string(), "BTC".to_string()]);
        assert_eq!(columns.iter().collect::<Vec<_>>(), vec!["ETH", "BTC"]);
    }
}
