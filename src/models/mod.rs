mod article;
mod keyword;

pub use article::{Article, NewArticle};
pub use keyword::KeywordCount;
