pub mod db;
pub mod gateway;
pub mod memory;
pub mod mongo;

pub use db::connect_to_mongo;
pub use gateway::CommentGateway;
pub use memory::MemoryCommentGateway;
pub use mongo::MongoCommentGateway;
