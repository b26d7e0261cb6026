use super::*;

/// Row counts for the startup status table.
#[async_trait::async_trait]
pub trait Check: Send + Sync {
    async fn count(&self, table: &'static str) -> usize;
    /// Liveness probe.
    async fn alive(&self) -> bool;
    async fn status(&self) {
        log::info!("┌──────────────┬──────────┐");
        log::info!("│ Table        │     Rows │");
        log::info!("├──────────────┼──────────┤");
        for table in [USERS, LISTINGS, VIEWINGS, NOTES, SCORES, PREFERENCES, AREAS, BUDGET] {
            log::info!("│ {:<12} │ {:>8} │", table, self.count(table).await);
        }
        log::info!("└──────────────┴──────────┘");
    }
}

#[async_trait::async_trait]
impl Check for Client {
    async fn count(&self, table: &'static str) -> usize {
        let sql = format!("SELECT COUNT(*) FROM {t}", t = table);
        self.query_opt(&sql, &[])
            .await
            .ok()
            .flatten()
            .map(|r| r.get::<_, i64>(0) as usize)
            .unwrap_or(0)
    }
    async fn alive(&self) -> bool {
        self.execute("SELECT 1", &[])
            .await
            .inspect_err(|e| log::error!("health check failed: {}", e))
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Tally(Mutex<Vec<&'static str>>);

    #[async_trait::async_trait]
    impl Check for Tally {
        async fn count(&self, table: &'static str) -> usize {
            self.0.lock().unwrap().push(table);
            0
        }
        async fn alive(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn status_counts_every_table() {
        let tally = Tally::default();
        tally.status().await;
        assert_eq!(
            *tally.0.lock().unwrap(),
            vec![USERS, LISTINGS, VIEWINGS, NOTES, SCORES, PREFERENCES, AREAS, BUDGET]
        );
    }
}
