//! The library code for the `draftpress` blog publisher. The architecture
//! can be generally broken down into two distinct steps:
//!
//! 1. Normalizing source text into an [`article::ArticleRecord`], either from
//!    language-model output ([`crate::completion`]) or from a Markdown draft
//!    ([`crate::parser`])
//! 2. Moving the rendered page through the draft/publish lifecycle
//!    ([`crate::build`])
//!
//! Of the two, the first step is the more involved, because neither source is
//! structured: values are picked out of labeled lines and anything missing is
//! replaced by a fixed default, so every record is always fully populated.
//!
//! The second step is pretty straight-forward: render the record into the
//! page template, write it to the drafts or published directory, append the
//! page to the sitemap, and commit and push the change. A failed push is
//! reported but doesn't undo the publication.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod article;
pub mod build;
pub mod completion;
pub mod config;
pub mod git;
pub mod markdown;
pub mod openai;
pub mod parser;
pub mod prompt;
pub mod sitemap;
pub mod template;
pub mod write;

mod util;
