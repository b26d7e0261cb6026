use serde::Deserialize;

/// Street address to coordinates. Best-effort: every failure is `None`.
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    async fn locate(&self, address: &str) -> Option<(f64, f64)>;
}

/// Nominatim-compatible search endpoint.
pub struct Nominatim {
    http: reqwest::Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

impl Nominatim {
    pub fn new(endpoint: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent(concat!("househunt/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
        })
    }

    async fn search(&self, address: &str) -> Result<Vec<Place>, reqwest::Error> {
        self.http
            .get(&self.endpoint)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Place>>()
            .await
    }
}

/// First result as `(latitude, longitude)`, if it parses and is in range.
fn first(places: Vec<Place>) -> Option<(f64, f64)> {
    places
        .into_iter()
        .next()
        .and_then(|p| Some((p.lat.parse::<f64>().ok()?, p.lon.parse::<f64>().ok()?)))
        .filter(|(lat, lon)| lat.abs() <= 90. && lon.abs() <= 180.)
}

#[async_trait::async_trait]
impl Geocoder for Nominatim {
    async fn locate(&self, address: &str) -> Option<(f64, f64)> {
        match self.search(address).await {
            Ok(places) => first(places),
            Err(e) => {
                log::warn!("geocoding '{}' failed: {}", address, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn places(json: &str) -> Vec<Place> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn first_result_wins() {
        let found = first(places(
            r#"[{"lat":"40.7128","lon":"-74.0060","display_name":"NYC"},{"lat":"1","lon":"1"}]"#,
        ));
        assert_eq!(found, Some((40.7128, -74.006)));
    }

    #[test]
    fn empty_or_garbled_results_are_none() {
        assert_eq!(first(places("[]")), None);
        assert_eq!(first(places(r#"[{"lat":"north","lon":"-74"}]"#)), None);
        assert_eq!(first(places(r#"[{"lat":"140","lon":"-74"}]"#)), None);
    }

    #[tokio::test]
    async fn unreachable_endpoints_degrade_to_none() {
        let geocoder = Nominatim::new("http://127.0.0.1:9/search").unwrap();
        assert_eq!(geocoder.locate("1 Main St").await, None);
    }
}
