//! 经济引擎流程集成测试
//!
//! 使用内存存储和计数网关，覆盖购买、开箱、使用物品的完整流程（无需外部依赖）

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use economy::dto::{
    AddCaseRewardRequest, ApplyOutcome, CreateBadgeItemRequest, CreateCaseRequest,
    CreateVipItemRequest,
};
use economy::service::{DrawSource, FixedDraw};
use economy::{
    Case, EconomyError, EconomyService, GatewayError, MemoryEconomyStore, PrivilegeGateway,
    RewardKind, RewardSelector, ShopItem,
};

// ==================== 测试替身 ====================

/// 记录调用次数的网关，可切换为失败模式
#[derive(Default)]
struct CountingGateway {
    grants: AtomicUsize,
    revokes: AtomicUsize,
    failing: AtomicBool,
}

impl CountingGateway {
    fn grants(&self) -> usize {
        self.grants.load(Ordering::SeqCst)
    }

    fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl PrivilegeGateway for CountingGateway {
    async fn grant_vip(&self, _login: &str) -> Result<(), GatewayError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::Timeout);
        }
        self.grants.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn revoke_vip(&self, _login: &str) -> Result<(), GatewayError> {
        self.revokes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// 依次返回预设值的抽奖源，耗尽后返回 0
struct SequenceDraw(Mutex<VecDeque<f64>>);

impl SequenceDraw {
    fn new(values: &[f64]) -> Self {
        Self(Mutex::new(values.iter().copied().collect()))
    }
}

impl DrawSource for SequenceDraw {
    fn draw(&self) -> f64 {
        self.0.lock().pop_front().unwrap_or(0.0)
    }
}

struct Fixture {
    store: Arc<MemoryEconomyStore>,
    gateway: Arc<CountingGateway>,
    service: Arc<EconomyService>,
}

fn fixture_with(source: Arc<dyn DrawSource>) -> Fixture {
    let store = MemoryEconomyStore::new();
    let gateway = Arc::new(CountingGateway::default());
    let service = Arc::new(EconomyService::new(
        store.repositories(),
        gateway.clone(),
        RewardSelector::new(source),
    ));
    Fixture {
        store,
        gateway,
        service,
    }
}

fn fixture(draw: f64) -> Fixture {
    fixture_with(Arc::new(FixedDraw(draw)))
}

async fn badge_item(service: &EconomyService, title: &str, cost: i64) -> ShopItem {
    service
        .catalog()
        .create_badge_item(CreateBadgeItemRequest {
            image: format!("/static/badges/{}.png", title),
            title: title.to_string(),
            cost,
        })
        .await
        .unwrap()
}

async fn new_case(service: &EconomyService, price: i64) -> Case {
    service
        .catalog()
        .create_case(CreateCaseRequest {
            title: "测试箱".to_string(),
            description: "集成测试用".to_string(),
            price,
            image: String::new(),
        })
        .await
        .unwrap()
}

async fn reward(
    service: &EconomyService,
    case_id: i64,
    kind: RewardKind,
    probability: f64,
    badge_id: Option<i64>,
    auk_value: Option<i64>,
) -> i64 {
    service
        .catalog()
        .add_case_reward(
            case_id,
            AddCaseRewardRequest {
                kind,
                probability,
                badge_id,
                auk_value,
            },
        )
        .await
        .unwrap()
        .id
}

// ==================== 购买 ====================

#[tokio::test]
async fn test_badge_purchase_auto_equips_and_marks_owned() {
    let f = fixture(0.0);
    let user_id = f.store.insert_user("alice", 100);
    let item = badge_item(&f.service, "star", 30).await;
    let badge_id = item.badge_id.unwrap();

    let result = f.service.purchase_item(user_id, item.id).await.unwrap();
    assert_eq!(result.balance, 70);
    assert_eq!(result.equipped_badge_id, Some(badge_id));
    assert_eq!(f.store.user(user_id).unwrap().badge_id, Some(badge_id));

    let items = f.service.list_shop_items(user_id).await.unwrap();
    let view = items.iter().find(|v| v.item.id == item.id).unwrap();
    assert!(view.owned);

    let owned = f.service.list_owned_badges(user_id).await.unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].id, badge_id);

    // 重复购买被拒绝，余额不变
    let err = f.service.purchase_item(user_id, item.id).await.unwrap_err();
    assert!(matches!(err, EconomyError::AlreadyOwned { .. }));
    assert_eq!(f.store.user(user_id).unwrap().rating, 70);
}

#[tokio::test]
async fn test_purchase_with_insufficient_balance_changes_nothing() {
    let f = fixture(0.0);
    let user_id = f.store.insert_user("bob", 10);
    let item = badge_item(&f.service, "moon", 30).await;

    let err = f.service.purchase_item(user_id, item.id).await.unwrap_err();
    assert!(matches!(
        err,
        EconomyError::InsufficientBalance {
            required: 30,
            available: 10
        }
    ));

    let user = f.store.user(user_id).unwrap();
    assert_eq!(user.rating, 10);
    assert_eq!(user.badge_id, None);
    assert!(f.service.list_owned_badges(user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_vip_purchase_failure_keeps_balance() {
    let f = fixture(0.0);
    let user_id = f.store.insert_user("carol", 100);
    let item = f
        .service
        .catalog()
        .create_vip_item(CreateVipItemRequest {
            title: "VIP 月卡".to_string(),
            cost: 50,
            image: String::new(),
        })
        .await
        .unwrap();

    f.gateway.fail(true);
    let err = f.service.purchase_item(user_id, item.id).await.unwrap_err();
    assert!(matches!(err, EconomyError::Gateway(_)));
    assert_eq!(f.store.user(user_id).unwrap().rating, 100);

    f.gateway.fail(false);
    let result = f.service.purchase_item(user_id, item.id).await.unwrap();
    assert_eq!(result.balance, 50);
    assert_eq!(f.gateway.grants(), 1);
    assert_eq!(f.gateway.revokes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unknown_shop_item() {
    let f = fixture(0.0);
    let user_id = f.store.insert_user("dave", 100);

    let err = f.service.purchase_item(user_id, 9999).await.unwrap_err();
    assert!(matches!(err, EconomyError::ShopItemNotFound(9999)));
}

// ==================== 开箱 ====================

#[tokio::test]
async fn test_open_case_without_selection_is_all_or_nothing() {
    // 概率总和 0.5，抽到 0.95 时未中
    let f = fixture(0.95);
    let user_id = f.store.insert_user("erin", 100);
    let case = new_case(&f.service, 40).await;
    reward(&f.service, case.id, RewardKind::Auk, 0.5, None, Some(300)).await;

    let err = f.service.open_case(case.id, user_id).await.unwrap_err();
    assert!(matches!(err, EconomyError::NoRewardSelected { .. }));
    assert_eq!(f.store.user(user_id).unwrap().rating, 100);
    assert!(f.store.entries(user_id).is_empty());
}

#[tokio::test]
async fn test_open_case_debits_and_grants() {
    let f = fixture(0.3);
    let user_id = f.store.insert_user("frank", 100);
    let item = badge_item(&f.service, "sun", 10).await;
    let case = new_case(&f.service, 40).await;
    let first = reward(&f.service, case.id, RewardKind::Auk, 0.25, None, Some(300)).await;
    let second = reward(
        &f.service,
        case.id,
        RewardKind::Badge,
        0.5,
        item.badge_id,
        None,
    )
    .await;

    let result = f.service.open_case(case.id, user_id).await.unwrap();
    assert_eq!(result.reward.reward.id, second);
    assert_ne!(result.reward.reward.id, first);
    assert_eq!(result.balance, 60);
    assert_eq!(f.store.user(user_id).unwrap().rating, 60);

    let entries = f.store.entries(user_id);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].reward_id, second);

    let inventory = f.service.list_inventory(user_id).await.unwrap();
    assert_eq!(inventory.len(), 1);
    assert_eq!(inventory[0].title, "徽章「sun」");

    // 中奖通知异步写入
    for _ in 0..50 {
        if !f.store.notifications().is_empty() {
            break;
        }
        tokio::task::yield_now().await;
    }
    let notifications = f.store.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].user_id, user_id);
    assert!(notifications[0].text.contains("徽章「sun」"));
}

#[tokio::test]
async fn test_open_case_insufficient_balance() {
    let f = fixture(0.1);
    let user_id = f.store.insert_user("gina", 10);
    let case = new_case(&f.service, 40).await;
    reward(&f.service, case.id, RewardKind::Vip, 1.0, None, None).await;

    let err = f.service.open_case(case.id, user_id).await.unwrap_err();
    assert!(matches!(err, EconomyError::InsufficientBalance { .. }));
    assert!(f.store.entries(user_id).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_open_case_never_overdraws() {
    let f = fixture(0.1);
    let user_id = f.store.insert_user("hank", 40);
    let case = new_case(&f.service, 40).await;
    reward(&f.service, case.id, RewardKind::Vip, 1.0, None, None).await;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = f.service.clone();
            let case_id = case.id;
            tokio::spawn(async move { service.open_case(case_id, user_id).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => assert!(matches!(e, EconomyError::InsufficientBalance { .. })),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(f.store.user(user_id).unwrap().rating, 0);
    assert_eq!(f.store.entries(user_id).len(), 1);
}

#[tokio::test]
async fn test_list_case_rewards_is_stable() {
    let f = fixture(0.0);
    let case = new_case(&f.service, 40).await;
    let a = reward(&f.service, case.id, RewardKind::Auk, 0.2, None, Some(500)).await;
    let b = reward(&f.service, case.id, RewardKind::Vip, 0.3, None, None).await;

    let first = f.service.list_case_rewards(case.id).await.unwrap();
    let second = f.service.list_case_rewards(case.id).await.unwrap();
    assert_eq!(first, second);

    let ids: Vec<i64> = first.iter().map(|r| r.reward.id).collect();
    assert_eq!(ids, vec![a, b]);
    assert_eq!(first[0].title, "500 卢布拍卖额度");

    let err = f.service.list_case_rewards(9999).await.unwrap_err();
    assert!(matches!(err, EconomyError::CaseNotFound(9999)));
}

// ==================== 使用物品 ====================

#[tokio::test]
async fn test_vip_reward_consumed_exactly_once() {
    let f = fixture(0.1);
    let user_id = f.store.insert_user("ivy", 100);
    let case = new_case(&f.service, 10).await;
    let vip = reward(&f.service, case.id, RewardKind::Vip, 1.0, None, None).await;

    f.service.open_case(case.id, user_id).await.unwrap();

    let outcome = f.service.apply_item(vip, user_id, None).await.unwrap();
    assert!(matches!(outcome, ApplyOutcome::VipGranted));
    assert_eq!(f.gateway.grants(), 1);
    assert!(f.store.entries(user_id).is_empty());

    let err = f.service.apply_item(vip, user_id, None).await.unwrap_err();
    assert!(matches!(err, EconomyError::NotOwned { .. }));
    assert_eq!(f.gateway.grants(), 1);
}

#[tokio::test]
async fn test_vip_reward_kept_when_gateway_fails() {
    let f = fixture(0.1);
    let user_id = f.store.insert_user("jack", 100);
    let case = new_case(&f.service, 10).await;
    let vip = reward(&f.service, case.id, RewardKind::Vip, 1.0, None, None).await;
    f.service.open_case(case.id, user_id).await.unwrap();

    f.gateway.fail(true);
    let err = f.service.apply_item(vip, user_id, None).await.unwrap_err();
    assert!(matches!(err, EconomyError::Gateway(GatewayError::Timeout)));
    assert_eq!(f.store.entries(user_id).len(), 1);
}

#[tokio::test]
async fn test_auction_reward_requires_lot_name() {
    let f = fixture_with(Arc::new(SequenceDraw::new(&[0.1, 0.1])));
    let user_id = f.store.insert_user("kate", 100);
    let case = new_case(&f.service, 10).await;
    let auk = reward(&f.service, case.id, RewardKind::Auk, 1.0, None, Some(250)).await;

    f.service.open_case(case.id, user_id).await.unwrap();
    f.service.open_case(case.id, user_id).await.unwrap();
    assert_eq!(f.store.entries(user_id).len(), 2);

    let err = f
        .service
        .apply_item(auk, user_id, Some("   "))
        .await
        .unwrap_err();
    assert!(matches!(err, EconomyError::Validation(_)));
    assert_eq!(f.store.entries(user_id).len(), 2);

    let outcome = f
        .service
        .apply_item(auk, user_id, Some(" 第一个拍品 "))
        .await
        .unwrap();
    match outcome {
        ApplyOutcome::AuctionSubmitted { submission } => {
            assert_eq!(submission.lot_name, "第一个拍品");
            assert_eq!(submission.auk_value, 250);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }

    // 两件相同奖励只消耗一件
    assert_eq!(f.store.entries(user_id).len(), 1);
    assert_eq!(f.store.submissions().len(), 1);
}

#[tokio::test]
async fn test_badge_reward_equips_and_keeps_entry() {
    let f = fixture(0.1);
    let user_id = f.store.insert_user("leo", 100);
    let item = badge_item(&f.service, "comet", 10).await;
    let badge_id = item.badge_id.unwrap();
    let case = new_case(&f.service, 10).await;
    let badge_reward = reward(
        &f.service,
        case.id,
        RewardKind::Badge,
        1.0,
        Some(badge_id),
        None,
    )
    .await;

    f.service.open_case(case.id, user_id).await.unwrap();

    let outcome = f
        .service
        .apply_item(badge_reward, user_id, None)
        .await
        .unwrap();
    assert!(matches!(outcome, ApplyOutcome::BadgeEquipped { badge_id: id } if id == badge_id));
    assert_eq!(f.store.user(user_id).unwrap().badge_id, Some(badge_id));
    assert_eq!(f.store.entries(user_id).len(), 1);
}

#[tokio::test]
async fn test_apply_badge_requires_existing_badge() {
    let f = fixture(0.0);
    let user_id = f.store.insert_user("mia", 0);
    let item = badge_item(&f.service, "planet", 10).await;

    let err = f.service.apply_badge(4242, user_id).await.unwrap_err();
    assert!(matches!(err, EconomyError::BadgeNotFound(4242)));

    f.service
        .apply_badge(item.badge_id.unwrap(), user_id)
        .await
        .unwrap();
    assert_eq!(f.store.user(user_id).unwrap().badge_id, item.badge_id);
}

#[test]
fn test_unknown_user_has_no_balance() {
    let f = fixture(0.0);
    let err = tokio_test::block_on(f.service.ledger().get_balance(777)).unwrap_err();
    assert!(matches!(err, EconomyError::UserNotFound(777)));
}
