//! Core trait abstractions for the notices library.
//!
//! Applications plug a transport in through [`fetcher::NoticeFetcher`] and a
//! persistence backend through [`store::NoticeStore`].

pub mod fetcher;
pub mod store;
