/// Data layer: module discovery, dependency extraction and filtering.
///
/// Architecture:
/// ```text
///  <root>/<collection>/.../<version>.lua
///        │
///        ▼
///   ┌──────────┐
///   │ scanner  │  list collections, walk module directories
///   └──────────┘
///     │      │
///     ▼      ▼
///  ┌──────┐ ┌────────┐
///  │ path │ │ loader │  decode toolchain context / read depends_on lines
///  └──────┘ └────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ CollectionScan │  record groups, one per module directory
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  keep groups whose dependencies mention a keyword
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod path;
pub mod scanner;
