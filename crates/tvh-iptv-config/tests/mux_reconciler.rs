//! Mux reconciliation passes against the SeaORM catalog and a recording tuner

mod common;

use std::time::Duration;

use common::{Harness, TunerCall, settle_request, source, stream, test_config};
use tvh_iptv_config::sources::PlaylistListing;
use tvh_iptv_config::tvheadend::{SCAN_STATE_PENDING, TunerChannel};

#[tokio::test]
async fn test_new_channel_gets_one_mux() {
    let harness = Harness::new().await;
    let playlist = harness.playlist("Provider", Some("net-1"), &["news-hd"]).await;
    let channel = harness
        .sync
        .settle_channel(settle_request("News", 101, vec![source(playlist.id, "news-hd")]))
        .await
        .unwrap();

    let report = harness.sync.run_reconciliation_pass().await.unwrap();

    assert_eq!(
        harness.tuner.calls()[0],
        TunerCall::CreateMux {
            network_uuid: "net-1".to_string()
        }
    );
    assert_eq!(harness.tuner.creates(), 1);
    let saves = harness.tuner.saves();
    assert_eq!(saves.len(), 1);
    let save = &saves[0];
    assert!(save.enabled);
    assert_eq!(save.iptv_sname, "News");
    assert_eq!(save.channel_number, 101);
    assert_eq!(save.iptv_epgid, "101");
    assert_eq!(save.iptv_muxname, "Provider - news-hd");
    assert_eq!(save.iptv_url, "http://provider/Provider/news-hd.ts");
    assert_eq!(save.iptv_icon, "http://logos/news-hd.png");
    assert_eq!(save.scan_state, Some(SCAN_STATE_PENDING));

    let stored = harness.channel(channel.id).await;
    assert_eq!(stored.sources[0].tvh_uuid.as_deref(), Some(save.uuid.as_str()));
    assert!(!stored.sources[0].tvh_scan_pending);

    assert_eq!(report.channels_visited, 1);
    assert_eq!(report.sources_linked, 1);
    assert_eq!(report.muxes_created, 1);
    assert_eq!(report.sources_failed, 0);
}

#[tokio::test]
async fn test_second_pass_only_saves() {
    let harness = Harness::new().await;
    let playlist = harness.playlist("P1", Some("net-1"), &["A", "B"]).await;
    harness
        .sync
        .settle_channel(settle_request(
            "Ch",
            7,
            vec![source(playlist.id, "A"), source(playlist.id, "B")],
        ))
        .await
        .unwrap();

    harness.sync.run_reconciliation_pass().await.unwrap();
    let linked = harness.events().len();
    harness.tuner.clear_calls();

    let report = harness.sync.run_reconciliation_pass().await.unwrap();

    assert_eq!(harness.tuner.creates(), 0);
    assert!(harness.tuner.deletes().is_empty());
    let saves = harness.tuner.saves();
    assert_eq!(saves.len(), 2);
    assert!(saves.iter().all(|save| save.scan_state.is_none()));
    assert_eq!(harness.events().len(), linked, "no new store writes");
    assert_eq!(report.muxes_created, 0);
    assert_eq!(report.sources_linked, 2);
}

#[tokio::test]
async fn test_missing_mux_is_reprovisioned() {
    let harness = Harness::new().await;
    let playlist = harness.playlist("P1", Some("net-1"), &["A"]).await;
    let channel = harness
        .sync
        .settle_channel(settle_request("Ch", 1, vec![source(playlist.id, "A")]))
        .await
        .unwrap();
    harness.sync.run_reconciliation_pass().await.unwrap();
    let stale = harness.channel(channel.id).await.sources[0]
        .tvh_uuid
        .clone()
        .unwrap();

    harness.tuner.remove_mux(&stale);
    harness.tuner.clear_calls();
    let report = harness.sync.run_reconciliation_pass().await.unwrap();

    let fresh = harness.channel(channel.id).await.sources[0]
        .tvh_uuid
        .clone()
        .unwrap();
    assert_ne!(fresh, stale);
    assert!(harness.tuner.muxes().contains(&fresh));
    assert_eq!(harness.tuner.creates(), 1);
    assert_eq!(harness.tuner.saves()[0].scan_state, Some(SCAN_STATE_PENDING));
    assert_eq!(report.drift_repaired, 1);
    assert_eq!(report.sources_failed, 0);
}

#[tokio::test]
async fn test_disabled_channel_is_left_alone() {
    let harness = Harness::new().await;
    let playlist = harness.playlist("P1", Some("net-1"), &["A"]).await;
    let channel = harness
        .sync
        .settle_channel(settle_request("Ch", 1, vec![source(playlist.id, "A")]))
        .await
        .unwrap();
    harness.sync.run_reconciliation_pass().await.unwrap();
    let linked = harness.channel(channel.id).await.sources[0].tvh_uuid.clone();

    let mut request = settle_request("Ch", 1, vec![source(playlist.id, "A")]);
    request.id = Some(channel.id);
    request.enabled = false;
    harness.sync.settle_channel(request).await.unwrap();
    harness.tuner.clear_calls();

    let report = harness.sync.run_reconciliation_pass().await.unwrap();

    assert!(harness.tuner.calls().is_empty());
    assert_eq!(harness.channel(channel.id).await.sources[0].tvh_uuid, linked);
    assert_eq!(report.channels_disabled, 1);
    assert_eq!(report.channels_visited, 0);
}

#[tokio::test]
async fn test_interrupted_pass_resumes_where_it_stopped() {
    let harness = Harness::new().await;
    let streams = ["s1", "s2", "s3", "s4"];
    let playlist = harness.playlist("P1", Some("net-1"), &streams).await;
    let channel = harness
        .sync
        .settle_channel(settle_request(
            "Ch",
            1,
            streams.iter().map(|s| source(playlist.id, s)).collect(),
        ))
        .await
        .unwrap();

    harness.store.crash_after_links(2);
    let report = harness.sync.run_reconciliation_pass().await.unwrap();
    assert_eq!(report.sources_linked, 2);
    assert_eq!(report.sources_failed, 2);

    let linked: Vec<_> = harness.channel(channel.id).await.sources[..2]
        .iter()
        .map(|s| s.tvh_uuid.clone().unwrap())
        .collect();

    harness.store.recover();
    harness.tuner.clear_calls();
    let report = harness.sync.run_reconciliation_pass().await.unwrap();

    assert_eq!(harness.tuner.creates(), 2);
    assert_eq!(report.muxes_created, 2);
    let stored = harness.channel(channel.id).await;
    let after: Vec<_> = stored.sources[..2]
        .iter()
        .map(|s| s.tvh_uuid.clone().unwrap())
        .collect();
    assert_eq!(after, linked);
    assert!(stored.sources.iter().all(|s| s.tvh_uuid.is_some()));
}

#[tokio::test]
async fn test_sources_without_prerequisites_are_skipped() {
    let harness = Harness::new().await;
    let no_network = harness.playlist("NoNet", None, &["A"]).await;
    let uncached = harness.playlist("Uncached", Some("net-2"), &["B"]).await;
    let shrunk = harness.playlist("Shrunk", Some("net-3"), &["C"]).await;
    let healthy = harness.playlist("Healthy", Some("net-4"), &["D"]).await;

    harness
        .sync
        .settle_channel(settle_request(
            "Ch",
            1,
            vec![
                source(no_network.id, "A"),
                source(uncached.id, "B"),
                source(shrunk.id, "C"),
                source(healthy.id, "D"),
            ],
        ))
        .await
        .unwrap();
    harness.cache.remove(uncached.id);
    harness.cache.insert(shrunk.id, PlaylistListing::new());

    let report = harness.sync.run_reconciliation_pass().await.unwrap();

    assert_eq!(report.sources_skipped, 3);
    assert_eq!(report.sources_linked, 1);
    assert_eq!(
        harness.tuner.calls()[0],
        TunerCall::CreateMux {
            network_uuid: "net-4".to_string()
        }
    );
    assert_eq!(harness.tuner.creates(), 1);
}

#[tokio::test]
async fn test_current_listing_url_is_pushed() {
    let harness = Harness::new().await;
    let playlist = harness.playlist("P1", Some("net-1"), &["A"]).await;
    let channel = harness
        .sync
        .settle_channel(settle_request("Ch", 1, vec![source(playlist.id, "A")]))
        .await
        .unwrap();
    harness.sync.run_reconciliation_pass().await.unwrap();

    let mut listing = PlaylistListing::new();
    listing.insert("A".to_string(), stream("http://moved/A.ts", None));
    harness.cache.insert(playlist.id, listing);
    harness.tuner.clear_calls();
    harness.sync.run_reconciliation_pass().await.unwrap();

    let save = &harness.tuner.saves()[0];
    assert_eq!(save.iptv_url, "http://moved/A.ts");
    assert_eq!(save.iptv_icon, "");
    assert_eq!(
        harness.channel(channel.id).await.sources[0].stream_url,
        "http://provider/P1/A.ts"
    );
}

#[tokio::test]
async fn test_stream_buffer_wraps_url() {
    let mut config = test_config();
    config.stream_buffer.enabled = true;
    config.stream_buffer.ffmpeg_args = "-i [URL] -metadata service_name=[SERVICE_NAME]".to_string();
    let harness = Harness::with_config(config).await;
    let playlist = harness.playlist("My List", Some("net-1"), &["News HD"]).await;
    harness
        .sync
        .settle_channel(settle_request("News", 1, vec![source(playlist.id, "News HD")]))
        .await
        .unwrap();

    harness.sync.run_reconciliation_pass().await.unwrap();

    assert_eq!(
        harness.tuner.saves()[0].iptv_url,
        "pipe://ffmpeg -i http://provider/My List/News HD.ts -metadata service_name=My_List_-_News_HD"
    );
}

#[tokio::test]
async fn test_slow_source_times_out_without_aborting_pass() {
    let mut config = test_config();
    config.reconciliation.source_timeout = "50ms".to_string();
    let harness = Harness::with_config(config).await;
    let playlist = harness.playlist("P1", Some("net-1"), &["A", "B"]).await;
    for (name, stream_name) in [("One", "A"), ("Two", "B")] {
        harness
            .sync
            .settle_channel(settle_request(name, 1, vec![source(playlist.id, stream_name)]))
            .await
            .unwrap();
    }

    harness.tuner.delay_saves(Duration::from_millis(500));
    let report = harness.sync.run_reconciliation_pass().await.unwrap();

    assert_eq!(report.channels_visited, 2);
    assert_eq!(report.sources_failed, 2);
    assert_eq!(report.sources_linked, 0);
}

#[tokio::test]
async fn test_slow_saves_never_provision_a_second_mux() {
    let mut config = test_config();
    config.reconciliation.source_timeout = "50ms".to_string();
    let harness = Harness::with_config(config).await;
    let playlist = harness.playlist("P1", Some("net-1"), &["A"]).await;
    let channel = harness
        .sync
        .settle_channel(settle_request("Ch", 1, vec![source(playlist.id, "A")]))
        .await
        .unwrap();

    harness.tuner.delay_saves(Duration::from_millis(200));
    for _ in 0..3 {
        let report = harness.sync.run_reconciliation_pass().await.unwrap();
        assert_eq!(report.sources_failed, 1);
    }

    assert_eq!(harness.tuner.creates(), 1);
    let stored = harness.channel(channel.id).await.sources[0].clone();
    let tracked = stored.tvh_uuid.clone().unwrap();
    assert_eq!(harness.tuner.muxes(), vec![tracked.clone()]);
    assert!(stored.tvh_scan_pending);

    harness.tuner.clear_save_delay();
    harness.tuner.clear_calls();
    let report = harness.sync.run_reconciliation_pass().await.unwrap();

    assert_eq!(report.sources_linked, 1);
    assert_eq!(harness.tuner.creates(), 0);
    let save = &harness.tuner.saves()[0];
    assert_eq!(save.uuid, tracked);
    assert_eq!(save.scan_state, Some(SCAN_STATE_PENDING));
    assert!(!harness.channel(channel.id).await.sources[0].tvh_scan_pending);

    harness.tuner.clear_calls();
    harness.sync.run_reconciliation_pass().await.unwrap();
    assert_eq!(harness.tuner.saves()[0].scan_state, None);
}

#[tokio::test]
async fn test_service_mapping_and_cleanup() {
    let harness = Harness::new().await;
    let names = [
        "News",
        "{name-not-set}",
        "Sports",
        "{name-not-set}",
        "Movies",
        "",
        "Kids",
        "{name-not-set}",
        "Music",
        "Weather",
    ];
    harness.tuner.set_channels(
        names
            .iter()
            .enumerate()
            .map(|(i, name)| TunerChannel {
                uuid: format!("ch-{i}"),
                name: name.to_string(),
            })
            .collect(),
    );

    harness.sync.map_all_services().await.unwrap();
    let deleted = harness.sync.cleanup_sentinel_channels().await.unwrap();

    assert_eq!(deleted, 3);
    assert_eq!(harness.tuner.calls()[0], TunerCall::MapServices);
    let remaining: Vec<_> = harness.tuner.channels().into_iter().map(|c| c.uuid).collect();
    assert_eq!(
        remaining,
        vec!["ch-0", "ch-2", "ch-4", "ch-5", "ch-6", "ch-8", "ch-9"]
    );
}

#[tokio::test]
async fn test_source_links_once_playlist_gets_a_network() {
    let harness = Harness::new().await;
    let playlist = harness.playlist("P1", None, &["A"]).await;
    let channel = harness
        .sync
        .settle_channel(settle_request("Ch", 1, vec![source(playlist.id, "A")]))
        .await
        .unwrap();

    let report = harness.sync.run_reconciliation_pass().await.unwrap();
    assert_eq!(report.sources_skipped, 1);
    assert!(harness.tuner.calls().is_empty());

    harness
        .catalog
        .playlists()
        .set_network_uuid(playlist.id, Some("net-9".to_string()))
        .await
        .unwrap();
    let report = harness.sync.run_reconciliation_pass().await.unwrap();

    assert_eq!(report.sources_linked, 1);
    assert_eq!(
        harness.tuner.calls()[0],
        TunerCall::CreateMux {
            network_uuid: "net-9".to_string()
        }
    );
    assert!(harness.channel(channel.id).await.sources[0].tvh_uuid.is_some());
}
