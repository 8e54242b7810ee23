mod account_age;
mod counts;
mod mention_network;
mod reactions;
mod social_graph;
mod word_count;
pub use self::account_age::*;
pub use self::counts::*;
pub use self::mention_network::*;
pub use self::reactions::*;
pub use self::social_graph::*;
pub use self::word_count::*;
