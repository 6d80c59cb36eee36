// Copyright (c) 2024-2025 The PicoPot Developers

//! Wallet lifecycle over the device handle

use picopot::Error;
use picopot_core::crypto;

mod helpers;
use helpers::loopback;

#[tokio::test]
async fn ping() {
    let mut device = loopback();
    device.ping().await.unwrap();
}

#[tokio::test]
async fn wallet_lifecycle() {
    let mut device = loopback();

    // Fresh device holds nothing
    assert_eq!(device.wallet_name().await.unwrap(), None);
    assert_eq!(device.public_key().await.unwrap(), None);
    assert_eq!(device.wallet_info().await.unwrap(), None);

    device.create_wallet("Main", "pw1", "pw1").await.unwrap();

    let info = device.wallet_info().await.unwrap().unwrap();
    assert_eq!(info.name, "Main");
    assert_eq!(info.address, bs58::encode(info.public_key).into_string());
    assert_eq!(device.address().await.unwrap(), Some(info.address.clone()));

    // Second create is refused
    assert!(matches!(
        device.create_wallet("Other", "pw2", "pw2").await,
        Err(Error::WalletExists)
    ));

    device.delete_wallet("pw1").await.unwrap();
    assert_eq!(device.wallet_info().await.unwrap(), None);
}

#[tokio::test]
async fn create_rejects_mismatched_passwords() {
    let mut device = loopback();
    assert!(matches!(
        device.create_wallet("W", "pw1", "pw2").await,
        Err(Error::PasswordMismatch)
    ));
    assert_eq!(device.wallet_name().await.unwrap(), None);
}

#[tokio::test]
async fn reveal_gated_on_password() {
    let mut device = loopback();

    assert!(matches!(
        device.reveal_seed("pw").await,
        Err(Error::NoWallet)
    ));

    device.create_wallet("W", "pw", "pw").await.unwrap();

    assert!(matches!(
        device.reveal_seed("wrong").await,
        Err(Error::WrongPassword)
    ));

    // Revealed seed derives the published public key
    let seed = device.reveal_seed("pw").await.unwrap();
    let public = device.public_key().await.unwrap().unwrap();
    assert_eq!(crypto::public_key(&seed.0), public);
}

#[tokio::test]
async fn delete_gated_on_password() {
    let mut device = loopback();
    device.create_wallet("W", "pw", "pw").await.unwrap();

    assert!(matches!(
        device.delete_wallet("nope").await,
        Err(Error::WrongPassword)
    ));

    device.delete_wallet("pw").await.unwrap();
    assert!(matches!(
        device.delete_wallet("pw").await,
        Err(Error::NoWallet)
    ));
}
