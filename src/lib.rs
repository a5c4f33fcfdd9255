//! 図書館の紙の本の貸出・予約エンジン
//!
//! 蔵書カタログ、予約待ち行列、取り置き台帳、貸出台帳、貸出禁止台帳を
//! `LendingCoordinator` がまとめ、論理時計で日付を進めて照合する。

pub mod adapters;
pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
