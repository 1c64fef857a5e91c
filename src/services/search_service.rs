use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    dto::search::SearchResults,
    error::AppResult,
    llm::CandidateProduct,
    models::Product,
    response::ApiResponse,
    state::AppState,
};

/// Combine the synchronous substring pass with the hosted model's semantic
/// pass. The remote pass is best-effort: on any failure the composer serves
/// local matches only and logs the reason.
pub async fn search(state: &AppState, query: &str) -> AppResult<ApiResponse<SearchResults>> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY created_at")
        .fetch_all(&state.pool)
        .await?;

    let remote_ids = match &state.llm {
        Some(llm) => {
            let candidates: Vec<CandidateProduct> =
                products.iter().map(CandidateProduct::from).collect();
            match llm.match_products(query, &candidates).await {
                Ok(ids) => ids,
                Err(err) => {
                    tracing::warn!(error = %err, "semantic search failed, local matches only");
                    Vec::new()
                }
            }
        }
        None => Vec::new(),
    };

    let items = compose_results(&products, query, &remote_ids);
    Ok(ApiResponse::success("Search", SearchResults { items }, None))
}

/// Local matches in catalog order first, then remote-only matches, deduped
/// by id. Remote ids that don't name a known product are dropped.
fn compose_results(products: &[Product], query: &str, remote_ids: &[String]) -> Vec<Product> {
    let mut results: Vec<Product> = Vec::new();
    let mut seen: HashSet<Uuid> = HashSet::new();

    for product in products.iter().filter(|p| matches_locally(p, query)) {
        if seen.insert(product.id) {
            results.push(product.clone());
        }
    }

    for raw_id in remote_ids {
        let Ok(id) = Uuid::parse_str(raw_id) else {
            continue;
        };
        if seen.contains(&id) {
            continue;
        }
        if let Some(product) = products.iter().find(|p| p.id == id) {
            seen.insert(id);
            results.push(product.clone());
        }
    }

    results
}

/// Case-insensitive substring match over name, brand, description and every
/// category label.
fn matches_locally(product: &Product, query: &str) -> bool {
    let q = query.to_lowercase();
    if q.is_empty() {
        return false;
    }
    product.name.to_lowercase().contains(&q)
        || product.brand.to_lowercase().contains(&q)
        || product.description.to_lowercase().contains(&q)
        || product
            .categories
            .iter()
            .any(|c| c.to_lowercase().contains(&q))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(name: &str, brand: &str, description: &str, categories: &[&str]) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.into(),
            brand: brand.into(),
            description: description.into(),
            price_cents: 10_000,
            discount_percent: 0,
            categories: categories.iter().map(|s| (*s).to_string()).collect(),
            image_url: None,
            image_file_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn local_match_covers_name_brand_description_and_categories() {
        let p = product("Sea Breeze", "Maison Azur", "citrus and oceanic notes", &["fresh"]);
        assert!(matches_locally(&p, "breeze"));
        assert!(matches_locally(&p, "AZUR"));
        assert!(matches_locally(&p, "oceanic"));
        assert!(matches_locally(&p, "fresh"));
        assert!(!matches_locally(&p, "oud"));
    }

    #[test]
    fn local_matches_come_first_in_catalog_order() {
        let a = product("Rose Oud", "A", "a rose perfume", &[]);
        let b = product("Amber Rose", "B", "warm amber", &[]);
        let c = product("Citrus Punch", "C", "zesty", &[]);
        let all = vec![a.clone(), b.clone(), c.clone()];

        let results = compose_results(&all, "rose", &[c.id.to_string()]);
        let ids: Vec<Uuid> = results.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[test]
    fn merge_deduplicates_by_id() {
        let a = product("Rose Oud", "A", "a rose perfume", &[]);
        let all = vec![a.clone()];

        let results = compose_results(&all, "rose", &[a.id.to_string(), a.id.to_string()]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, a.id);
    }

    #[test]
    fn remote_only_match_survives_without_local_hits() {
        // Query "summer" appears nowhere; the remote pass still names one id.
        let a = product("Sea Breeze", "Azur", "citrus and oceanic notes", &["fresh"]);
        let b = product("Oud Nights", "Noir", "deep smoky amber", &["oriental"]);
        let all = vec![a.clone(), b];

        let results = compose_results(&all, "summer", &[a.id.to_string()]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, a.id);
    }

    #[test]
    fn unknown_and_malformed_remote_ids_are_dropped() {
        let a = product("Sea Breeze", "Azur", "citrus", &[]);
        let all = vec![a];

        let results = compose_results(
            &all,
            "summer",
            &[Uuid::new_v4().to_string(), "not-a-uuid".into()],
        );
        assert!(results.is_empty());
    }

    #[test]
    fn empty_query_matches_nothing_locally() {
        let p = product("Sea Breeze", "Azur", "citrus", &[]);
        assert!(!matches_locally(&p, ""));
    }
}
