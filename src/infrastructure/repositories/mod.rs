pub mod feed_repository;

pub use feed_repository::FeedRepository;
