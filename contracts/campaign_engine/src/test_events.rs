use std::sync::Arc;

use crate::testutils::*;
use crate::{
    CampaignEngine, CampaignEvent, ChannelSink, EngineConfig, EventSink, Identity, RecordedEvent,
    RevenueShares, TracingSink,
};

#[test]
fn test_campaign_created_event() {
    let (engine, sink) = setup();
    let id = create_campaign(&engine);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].timestamp, START);
    assert_eq!(
        events[0].event,
        CampaignEvent::CampaignCreated {
            campaign_id: id,
            creator: creator(),
            funding_goal: 1_000,
            deadline: DEADLINE,
        }
    );
}

#[test]
fn test_investment_recorded_event() {
    let (engine, sink) = setup();
    let id = create_campaign(&engine);
    engine.invest(id, &investor(1), 100, START + 10).unwrap();

    let last = sink.events().last().cloned().expect("No events found");
    assert_eq!(last.timestamp, START + 10);
    assert_eq!(
        last.event,
        CampaignEvent::InvestmentRecorded {
            campaign_id: id,
            investor: investor(1),
            amount: 100,
            token_amount: 100_000,
        }
    );
}

#[test]
fn test_milestone_events_in_order() {
    let (engine, sink) = setup();
    let id = create_campaign(&engine);
    engine.invest(id, &investor(1), 1_000, START + 1).unwrap();
    let mid = engine.add_milestone(id, &creator(), draft(500, START), START + 2).unwrap();
    engine.complete_milestone(id, &creator(), mid, START + 3).unwrap();
    engine.release_milestone_funds(id, &creator(), mid, START + 4).unwrap();

    assert_eq!(
        sink.kinds(),
        vec![
            "campaign_created",
            "investment_recorded",
            "milestone_added",
            "milestone_completed",
            "milestone_released",
        ]
    );
    assert_eq!(
        sink.last(),
        Some(CampaignEvent::MilestoneReleased {
            campaign_id: id,
            milestone_id: mid,
            amount: 500,
        })
    );
}

#[test]
fn test_failed_operations_publish_nothing() {
    let (engine, sink) = setup();
    let id = create_campaign(&engine);
    let stranger = Identity::new("0xstranger");

    let _ = engine.invest(id, &investor(1), 0, START + 1);
    let _ = engine.add_milestone(id, &stranger, draft(10, START), START + 1);
    let _ = engine.complete_milestone(id, &creator(), 9, START + 1);
    let _ = engine.close_expired(id, START + 1);
    let _ = engine.refund(id, &investor(1), START + 1);

    assert_eq!(sink.kinds(), vec!["campaign_created"]);
}

#[test]
fn test_lifecycle_events() {
    let (engine, sink) = setup();
    let id = create_campaign(&engine);
    let operator = Identity::new("0xoperator");
    engine.grant_operator(id, &creator(), &operator, START).unwrap();
    // Granting twice is not a change and is not published again.
    engine.grant_operator(id, &creator(), &operator, START).unwrap();
    engine.revoke_operator(id, &creator(), &operator, START).unwrap();
    engine.revoke_operator(id, &creator(), &operator, START).unwrap();
    engine.invest(id, &investor(1), 400, START + 1).unwrap();
    engine.close_expired(id, DEADLINE).unwrap();
    engine.refund(id, &investor(1), DEADLINE + 1).unwrap();

    assert_eq!(
        sink.kinds(),
        vec![
            "campaign_created",
            "operator_granted",
            "operator_revoked",
            "investment_recorded",
            "campaign_failed",
            "refund_issued",
        ]
    );
    assert_eq!(
        sink.last(),
        Some(CampaignEvent::RefundIssued {
            campaign_id: id,
            investor: investor(1),
            amount: 400,
        })
    );
}

#[test]
fn test_revenue_distributed_event() {
    let (engine, sink) = setup();
    let id = create_campaign(&engine);
    engine.invest(id, &investor(1), 500, START + 1).unwrap();
    engine.distribute_revenue(id, &creator(), 10_000, START + 2).unwrap();

    assert_eq!(
        sink.last(),
        Some(CampaignEvent::RevenueDistributed {
            campaign_id: id,
            shares: RevenueShares {
                platform: 500,
                creator: 2_000,
                investor: 7_500,
            },
        })
    );
}

#[test]
fn test_event_json_round_trip() {
    let event = RecordedEvent {
        timestamp: START,
        event: CampaignEvent::InvestmentRecorded {
            campaign_id: 3,
            investor: investor(1),
            amount: 1_000_000_000_000_000_000_000,
            token_amount: 42,
        },
    };
    let json = event.to_json().unwrap();
    assert!(json.contains("\"investment_recorded\""));
    assert!(json.contains("\"0xinvestor01\""));

    let decoded: RecordedEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, event);
    assert_eq!(decoded.event.kind(), "investment_recorded");
    assert_eq!(decoded.event.campaign_id(), 3);
}

#[tokio::test]
async fn test_channel_sink_delivers_events_to_indexer_task() {
    init_tracing();
    let (sink, mut rx) = ChannelSink::new();
    let engine = CampaignEngine::with_sink(EngineConfig::default(), Arc::new(sink)).unwrap();

    let indexer = tokio::spawn(async move {
        let mut kinds = Vec::new();
        while let Some(event) = rx.recv().await {
            kinds.push(event.event.kind());
        }
        kinds
    });

    let id = create_campaign(&engine);
    engine.invest(id, &investor(1), 100, START + 1).unwrap();
    engine.invest(id, &investor(2), 900, START + 2).unwrap();
    // Dropping the engine drops the last sender and ends the indexer loop.
    drop(engine);

    let kinds = indexer.await.unwrap();
    assert_eq!(
        kinds,
        vec!["campaign_created", "investment_recorded", "investment_recorded"]
    );
}

#[test]
fn test_closed_channel_does_not_fail_operations() {
    let (sink, rx) = ChannelSink::new();
    drop(rx);
    let engine = CampaignEngine::with_sink(EngineConfig::default(), Arc::new(sink)).unwrap();

    let id = create_campaign(&engine);
    assert_eq!(engine.invest(id, &investor(1), 100, START + 1).unwrap(), 100_000);
}

#[test]
fn test_tracing_sink_accepts_events() {
    init_tracing();
    TracingSink.publish(&RecordedEvent {
        timestamp: START,
        event: CampaignEvent::CampaignCompleted { campaign_id: 0 },
    });
}
