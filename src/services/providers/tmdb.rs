//! TMDB catalog provider.
//!
//! Discover queries push the profile's genre, year, rating, and runtime
//! filters to the provider where it supports them; detail lookups append the
//! credits needed for cast/director matching.

use reqwest::Client as HttpClient;

use crate::{
    error::{AppError, AppResult},
    models::{
        tmdb::{TmdbDetails, TmdbPage},
        CatalogItem, MediaFilter, MediaType, PreferenceProfile,
    },
    services::providers::CatalogProvider,
};

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    language: String,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String, language: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            language,
        }
    }

    /// Performs a GET against a TMDB endpoint and decodes the JSON body
    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        extra_params: &[(String, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        tracing::debug!(path = %path, "Fetching from catalog provider");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
            ])
            .query(extra_params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                path = %path,
                status = %status,
                body = %body,
                "Catalog provider request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "Provider returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    fn discover_params(prefs: &PreferenceProfile, page: u32) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), page.to_string()),
            ("sort_by".to_string(), "popularity.desc".to_string()),
            // Minimum vote count keeps junk entries out of the pool
            ("vote_count.gte".to_string(), "100".to_string()),
        ];

        if !prefs.selected_genres.is_empty() {
            let mut genres: Vec<u32> = prefs.selected_genres.iter().copied().collect();
            genres.sort_unstable();
            let joined = genres
                .iter()
                .map(|g| g.to_string())
                .collect::<Vec<_>>()
                .join(",");
            params.push(("with_genres".to_string(), joined));
        }

        if let Some(range) = prefs.year_range {
            params.push((
                "primary_release_date.gte".to_string(),
                format!("{}-01-01", range.min),
            ));
            params.push((
                "primary_release_date.lte".to_string(),
                format!("{}-12-31", range.max),
            ));
        }

        if prefs.min_rating > 0.0 {
            params.push(("vote_average.gte".to_string(), prefs.min_rating.to_string()));
        }

        if let Some(range) = prefs.duration_range {
            params.push(("with_runtime.gte".to_string(), range.min.to_string()));
            params.push(("with_runtime.lte".to_string(), range.max.to_string()));
        }

        params
    }

    async fn discover_one(
        &self,
        media_type: MediaType,
        prefs: &PreferenceProfile,
        page: u32,
    ) -> AppResult<Vec<CatalogItem>> {
        let path = match media_type {
            MediaType::Movie => "/discover/movie",
            MediaType::Show => "/discover/tv",
        };

        let page: TmdbPage = self
            .request(path, &Self::discover_params(prefs, page))
            .await?;

        Ok(page
            .results
            .into_iter()
            .map(|raw| raw.into_item(media_type))
            .collect())
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn discover(&self, prefs: &PreferenceProfile, page: u32) -> AppResult<Vec<CatalogItem>> {
        let items = match prefs.media_type_filter {
            MediaFilter::Movie => self.discover_one(MediaType::Movie, prefs, page).await?,
            MediaFilter::Show => self.discover_one(MediaType::Show, prefs, page).await?,
            MediaFilter::Both => {
                // Both discover pages are independent; fetch them concurrently
                let (movies, shows) = tokio::try_join!(
                    self.discover_one(MediaType::Movie, prefs, page),
                    self.discover_one(MediaType::Show, prefs, page)
                )?;
                movies.into_iter().chain(shows).collect()
            }
        };

        tracing::info!(count = items.len(), page = page, "Discovered candidates");

        Ok(items)
    }

    async fn details(&self, id: u64, media_type: MediaType) -> AppResult<CatalogItem> {
        let path = match media_type {
            MediaType::Movie => format!("/movie/{}", id),
            MediaType::Show => format!("/tv/{}", id),
        };

        let details: TmdbDetails = self
            .request(
                &path,
                &[("append_to_response".to_string(), "credits".to_string())],
            )
            .await?;

        Ok(details.into_item(media_type))
    }

    async fn similar(&self, id: u64, media_type: MediaType) -> AppResult<Vec<CatalogItem>> {
        let path = match media_type {
            MediaType::Movie => format!("/movie/{}/similar", id),
            MediaType::Show => format!("/tv/{}/similar", id),
        };

        let page: TmdbPage = self.request(&path, &[]).await?;

        Ok(page
            .results
            .into_iter()
            .map(|raw| raw.into_item(media_type))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RangeFilter;

    #[test]
    fn test_discover_params_inactive_filters_omitted() {
        let prefs = PreferenceProfile::default();
        let params = TmdbProvider::discover_params(&prefs, 1);

        assert!(params.iter().all(|(k, _)| k != "with_genres"));
        assert!(params.iter().all(|(k, _)| k != "vote_average.gte"));
        assert!(params.iter().all(|(k, _)| !k.starts_with("primary_release_date")));
    }

    #[test]
    fn test_discover_params_carry_active_filters() {
        let mut prefs = PreferenceProfile::default();
        prefs.selected_genres.insert(35);
        prefs.selected_genres.insert(28);
        prefs.min_rating = 6.5;
        prefs.year_range = Some(RangeFilter { min: 1990, max: 2010 });

        let params = TmdbProvider::discover_params(&prefs, 2);

        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("page"), Some("2"));
        assert_eq!(get("with_genres"), Some("28,35"));
        assert_eq!(get("vote_average.gte"), Some("6.5"));
        assert_eq!(get("primary_release_date.gte"), Some("1990-01-01"));
        assert_eq!(get("primary_release_date.lte"), Some("2010-12-31"));
    }
}
