use axum::extract::RawPathParams;

/// Percent-decoded path parameters of the matched route, in route order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value captured for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for PathParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<&RawPathParams> for PathParams {
    fn from(raw: &RawPathParams) -> Self {
        raw.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        let params: PathParams = [("classroomId", "42"), ("studentId", "7")]
            .into_iter()
            .collect();

        assert_eq!(params.get("classroomId"), Some("42"));
        assert_eq!(params.get("studentId"), Some("7"));
        assert_eq!(params.get("teacherId"), None);
        assert_eq!(params.len(), 2);
    }
}
