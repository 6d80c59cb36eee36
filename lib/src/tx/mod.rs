// Copyright (c) 2024-2025 The PicoPot Developers

//! Fee-aware transfer construction and signing

mod builder;

pub use builder::{AmountDecision, SendReceipt, TransferBuilder, FALLBACK_FEE_LAMPORTS};
