// Copyright (c) 2024-2025 The PicoPot Developers

//! Transfer flow against a scripted ledger

use picopot::{
    tx::{AmountDecision, TransferBuilder, FALLBACK_FEE_LAMPORTS},
    Error,
};
use picopot_core::crypto;

mod helpers;
use helpers::{loopback, MockLedger};

const RECIPIENT_KEY: [u8; 32] = [2u8; 32];

fn recipient() -> String {
    bs58::encode(RECIPIENT_KEY).into_string()
}

#[tokio::test]
async fn send_within_balance() {
    let mut device = loopback();
    device.create_wallet("W", "pw", "pw").await.unwrap();
    let sender = device.public_key().await.unwrap().unwrap();

    let ledger = MockLedger::new(1_000_000_000, Some(10_000));

    let receipt = TransferBuilder::new(&mut device, &ledger)
        .send(&recipient(), 500_000, "pw")
        .await
        .unwrap();

    assert_eq!(receipt.decision, AmountDecision::Requested(500_000));
    assert_eq!(receipt.fee, 11_000);

    let tx = ledger.only_broadcast();
    assert_eq!(tx.draft.sender, sender);
    assert_eq!(tx.draft.recipient, RECIPIENT_KEY);
    assert_eq!(tx.draft.lamports, 500_000);

    // The broadcast signature verifies under the device key
    assert!(crypto::verify(&sender, &tx.draft.message(), &tx.signature));
}

#[tokio::test]
async fn send_adjusts_to_balance() {
    let mut device = loopback();
    device.create_wallet("W", "pw", "pw").await.unwrap();

    let ledger = MockLedger::new(1_000_000_000, Some(10_000));

    // Requesting the whole balance leaves nothing for the fee; the
    // amount drops to balance minus the padded fee
    let receipt = TransferBuilder::new(&mut device, &ledger)
        .send(&recipient(), 1_000_000_000, "pw")
        .await
        .unwrap();

    assert_eq!(
        receipt.decision,
        AmountDecision::Adjusted {
            requested: 1_000_000_000,
            adjusted: 999_989_000,
        }
    );
    assert_eq!(receipt.decision.lamports(), 999_989_000);
    assert_eq!(ledger.only_broadcast().draft.lamports, 999_989_000);
}

#[tokio::test]
async fn send_rejects_insufficient_balance() {
    let mut device = loopback();
    device.create_wallet("W", "pw", "pw").await.unwrap();

    // Balance below the padded fee itself
    let ledger = MockLedger::new(5_000, Some(10_000));

    let res = TransferBuilder::new(&mut device, &ledger)
        .send(&recipient(), 1_000, "pw")
        .await;

    match res {
        Err(Error::InsufficientFunds { balance, required }) => {
            assert_eq!(balance, 5_000);
            assert_eq!(required, 1_000 + 11_000);
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(ledger.broadcasts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn send_falls_back_when_estimation_fails() {
    let mut device = loopback();
    device.create_wallet("W", "pw", "pw").await.unwrap();

    let ledger = MockLedger::new(1_000_000_000, None);

    let receipt = TransferBuilder::new(&mut device, &ledger)
        .send(&recipient(), 500_000, "pw")
        .await
        .unwrap();

    // Fallback fee plus the ten percent buffer
    assert_eq!(
        receipt.fee,
        FALLBACK_FEE_LAMPORTS + FALLBACK_FEE_LAMPORTS / 10
    );
    assert_eq!(receipt.decision, AmountDecision::Requested(500_000));
}

#[tokio::test]
async fn send_survives_absurd_fee_quote() {
    let mut device = loopback();
    device.create_wallet("W", "pw", "pw").await.unwrap();

    // A hostile or broken ledger can quote any u64; padding must not
    // wrap the fee back down
    let ledger = MockLedger::new(1_000_000_000, Some(u64::MAX));

    let res = TransferBuilder::new(&mut device, &ledger)
        .send(&recipient(), 500, "pw")
        .await;

    match res {
        Err(Error::InsufficientFunds { balance, required }) => {
            assert_eq!(balance, 1_000_000_000);
            assert_eq!(required, u64::MAX);
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(ledger.broadcasts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn send_requires_valid_address() {
    let mut device = loopback();
    device.create_wallet("W", "pw", "pw").await.unwrap();
    let ledger = MockLedger::new(1_000_000_000, Some(10_000));

    let res = TransferBuilder::new(&mut device, &ledger)
        .send("not-an-address", 500, "pw")
        .await;
    assert!(matches!(res, Err(Error::InvalidAddress)));
}

#[tokio::test]
async fn send_requires_password() {
    let mut device = loopback();
    device.create_wallet("W", "pw", "pw").await.unwrap();
    let ledger = MockLedger::new(1_000_000_000, Some(10_000));

    let res = TransferBuilder::new(&mut device, &ledger)
        .send(&recipient(), 500, "wrong")
        .await;

    assert!(matches!(res, Err(Error::WrongPassword)));
    assert!(ledger.broadcasts.lock().unwrap().is_empty());
}
