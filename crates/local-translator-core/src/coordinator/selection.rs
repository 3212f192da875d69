use crate::translator::ModelEntry;

/// Pick the model to use after a directory refresh.
///
/// Order: the prior selection if still listed, else the favorite if listed,
/// else the first listed model. `None` only for an empty listing.
pub fn choose_model(
    prior: Option<&str>,
    favorite: Option<&str>,
    models: &[ModelEntry],
) -> Option<String> {
    let listed = |id: &str| models.iter().any(|m| m.id == id);

    prior
        .filter(|id| listed(id))
        .or_else(|| favorite.filter(|id| listed(id)))
        .map(str::to_string)
        .or_else(|| models.first().map(|m| m.id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(ids: &[&str]) -> Vec<ModelEntry> {
        ids.iter().map(|id| ModelEntry::new(*id)).collect()
    }

    #[test]
    fn test_prior_selection_wins() {
        let models = listing(&["llama3", "gemma2", "mistral"]);
        assert_eq!(
            choose_model(Some("mistral"), Some("gemma2"), &models).as_deref(),
            Some("mistral")
        );
    }

    #[test]
    fn test_favorite_when_prior_missing() {
        let models = listing(&["llama3", "gemma2"]);
        assert_eq!(
            choose_model(Some("removed"), Some("gemma2"), &models).as_deref(),
            Some("gemma2")
        );
        assert_eq!(choose_model(None, Some("gemma2"), &models).as_deref(), Some("gemma2"));
    }

    #[test]
    fn test_first_listed_as_last_resort() {
        let models = listing(&["llama3", "gemma2"]);
        assert_eq!(
            choose_model(Some("gone"), Some("also-gone"), &models).as_deref(),
            Some("llama3")
        );
        assert_eq!(choose_model(None, None, &models).as_deref(), Some("llama3"));
    }

    #[test]
    fn test_empty_listing() {
        assert_eq!(choose_model(Some("llama3"), Some("llama3"), &[]), None);
    }
}
