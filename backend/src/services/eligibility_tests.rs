#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use crate::api::{CatalogueEntry, InclusionRange, Observation};
    use crate::catalogue::Catalogue;
    use crate::db::repositories::LocalRepository;
    use crate::error::NemesisError;
    use crate::services::eligibility::{bosses_for_world, compute_view, is_spawnable, spawnables};

    fn ferumbras_catalogue() -> Catalogue {
        Catalogue::from_entries(vec![CatalogueEntry::new(
            "Ferumbras",
            Some(InclusionRange::new(7, 14)),
        )])
    }

    fn obs(name: &str) -> Observation {
        Observation::new("Antica", name, Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap())
    }

    const RANGE: Option<InclusionRange> = Some(InclusionRange { min_days: 7, max_days: 14 });

    #[test]
    fn test_no_range_requires_positive_percent() {
        assert!(is_spawnable(&obs("Yeti").with_percent(5), None));
        assert!(!is_spawnable(&obs("Yeti").with_percent(0), None));
        assert!(!is_spawnable(&obs("Yeti").with_days_since_kill(40), None));
        assert!(!is_spawnable(&obs("Yeti").no_chance(), None));
    }

    #[test]
    fn test_range_with_unknown_days_is_spawnable() {
        assert!(is_spawnable(&obs("Ferumbras"), RANGE));
        assert!(is_spawnable(&obs("Ferumbras").no_chance(), RANGE));
    }

    #[test]
    fn test_range_below_min_is_not_spawnable() {
        let o = obs("Ferumbras").with_days_since_kill(6).with_percent(90);
        assert!(!is_spawnable(&o, RANGE));
    }

    #[test]
    fn test_range_band_boundaries() {
        // min is inclusive, max is exclusive
        let at_min = obs("Ferumbras").with_days_since_kill(7).with_percent(1);
        assert!(is_spawnable(&at_min, RANGE));
        let in_band_no_percent = obs("Ferumbras").with_days_since_kill(13);
        assert!(!is_spawnable(&in_band_no_percent, RANGE));
        let at_max = obs("Ferumbras").with_days_since_kill(14);
        assert!(is_spawnable(&at_max, RANGE));
    }

    #[test]
    fn test_in_band_no_chance_wins_over_stray_percent() {
        let o = obs("Ferumbras").with_days_since_kill(10).with_percent(45).no_chance();
        assert!(!is_spawnable(&o, RANGE));
    }

    #[test]
    fn test_scenario_in_band_positive_percent() {
        let now = Utc::now();
        let view = compute_view(
            "Antica",
            vec![obs("Ferumbras").with_days_since_kill(10).with_percent(45)],
            &ferumbras_catalogue(),
            now,
        );
        assert_eq!(view.bosses.len(), 1);
        let boss = &view.bosses[0];
        assert_eq!(boss.name, "Ferumbras");
        assert_eq!(boss.days_since_kill, Some(10));
        assert_eq!(boss.percent, Some(45));
        assert!(boss.spawnable);
    }

    #[test]
    fn test_scenario_in_band_no_chance() {
        let view = compute_view(
            "Antica",
            vec![obs("Ferumbras").with_days_since_kill(10).no_chance()],
            &ferumbras_catalogue(),
            Utc::now(),
        );
        assert!(!view.bosses[0].spawnable);
    }

    #[test]
    fn test_scenario_past_window_overrides_no_chance() {
        let view = compute_view(
            "Antica",
            vec![obs("Ferumbras").with_days_since_kill(20).no_chance()],
            &ferumbras_catalogue(),
            Utc::now(),
        );
        assert!(view.bosses[0].spawnable);
    }

    #[test]
    fn test_catalogue_boss_never_scraped_is_placeholder() {
        let now = Utc::now();
        let view = compute_view("Antica", Vec::new(), &ferumbras_catalogue(), now);

        assert_eq!(view.updated_at, now);
        assert_eq!(view.bosses.len(), 1);
        let boss = &view.bosses[0];
        assert_eq!(boss.name, "Ferumbras");
        assert_eq!(boss.percent, None);
        assert_eq!(boss.days_since_kill, None);
        assert!(boss.spawnable);
    }

    #[test]
    fn test_catalogue_casing_wins_for_display() {
        let view = compute_view(
            "Antica",
            vec![obs("FERUMBRAS").with_days_since_kill(3)],
            &ferumbras_catalogue(),
            Utc::now(),
        );
        assert_eq!(view.bosses.len(), 1);
        assert_eq!(view.bosses[0].name, "Ferumbras");
        assert!(!view.bosses[0].spawnable);
    }

    #[test]
    fn test_updated_at_ignores_placeholders() {
        let older = obs("Yeti").with_percent(3);
        let mut newer = obs("Zushuka").with_percent(0);
        newer.updated_at = older.updated_at + Duration::hours(2);
        let now = newer.updated_at + Duration::days(30);

        let view = compute_view("Antica", vec![older, newer.clone()], &ferumbras_catalogue(), now);
        assert_eq!(view.updated_at, newer.updated_at);
    }

    #[test]
    fn test_sorted_by_name_and_deterministic() {
        let catalogue = Catalogue::from_entries(vec![
            CatalogueEntry::new("Morgaroth", None),
            CatalogueEntry::new("Ferumbras", Some(InclusionRange::new(7, 14))),
        ]);
        let rows = vec![obs("Zushuka").with_percent(2), obs("Yeti").with_percent(0)];
        let now = Utc::now();

        let first = compute_view("Antica", rows.clone(), &catalogue, now);
        let names: Vec<&str> = first.bosses.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["Ferumbras", "Morgaroth", "Yeti", "Zushuka"]);

        let mut reversed = rows;
        reversed.reverse();
        assert_eq!(compute_view("Antica", reversed, &catalogue, now), first);
    }

    #[test]
    fn test_case_duplicates_prefer_latest_row() {
        let stale = obs("yeti").with_percent(0);
        let mut fresh = obs("Yeti").with_percent(8);
        fresh.updated_at = stale.updated_at + Duration::minutes(5);

        let view = compute_view("Antica", vec![fresh, stale], &Catalogue::empty(), Utc::now());
        assert_eq!(view.bosses.len(), 1);
        assert_eq!(view.bosses[0].name, "Yeti");
        assert_eq!(view.bosses[0].percent, Some(8));
    }

    #[tokio::test]
    async fn test_bosses_for_world_reads_store() {
        let repo = LocalRepository::new();
        crate::db::services::store_observations(
            &repo,
            "Antica",
            &[
                obs("Ferumbras").with_days_since_kill(10).no_chance(),
                obs("Yeti").with_percent(12),
            ],
        )
        .await
        .unwrap();

        let catalogue = ferumbras_catalogue();
        let all = bosses_for_world(&repo, &catalogue, "Antica").await.unwrap();
        assert_eq!(all.world, "Antica");
        assert_eq!(all.bosses.len(), 2);

        let eligible = spawnables(&repo, &catalogue, "Antica").await.unwrap();
        assert_eq!(eligible.bosses.len(), 1);
        assert_eq!(eligible.bosses[0].name, "Yeti");
    }

    #[tokio::test]
    async fn test_empty_world_is_invalid_argument() {
        let repo = LocalRepository::new();
        repo.set_healthy(false);
        let err = bosses_for_world(&repo, &Catalogue::empty(), "").await.unwrap_err();
        assert!(matches!(err, NemesisError::InvalidArgument(_)));
    }
}
