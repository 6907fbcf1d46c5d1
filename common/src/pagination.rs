//! Abstractions for offset pagination.

/// Pagination arguments.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Arguments {
    /// Number of the requested page, starting from `1`.
    page: u32,

    /// Maximum number of items on a page.
    limit: u32,
}

impl Arguments {
    /// Default number of items on a page.
    pub const DEFAULT_LIMIT: u32 = 20;

    /// Maximum allowed number of items on a page.
    pub const MAX_LIMIT: u32 = 100;

    /// Creates new [`Arguments`], falling back to the first page and the
    /// [`Arguments::DEFAULT_LIMIT`].
    ///
    /// [`None`] is returned if the `page` or the `limit` is zero, or the
    /// `limit` exceeds [`Arguments::MAX_LIMIT`].
    #[must_use]
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Option<Self> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(Self::DEFAULT_LIMIT);
        (page > 0 && limit > 0 && limit <= Self::MAX_LIMIT)
            .then_some(Self { page, limit })
    }

    /// Returns the number of the requested page.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Returns the maximum number of items on a page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the number of items to skip before the requested page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        (u64::from(self.page) - 1) * u64::from(self.limit)
    }
}

impl Default for Arguments {
    fn default() -> Self {
        Self {
            page: 1,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// Pagination selector.
#[derive(Clone, Debug)]
pub struct Selector<F> {
    /// Pagination [`Arguments`].
    pub arguments: Arguments,

    /// Additional filter being applied to the result.
    pub filter: F,
}

/// A page of items.
#[derive(Clone, Debug)]
pub struct Page<I> {
    /// Items on this [`Page`].
    pub items: Vec<I>,

    /// [`Arguments`] this [`Page`] was selected with.
    pub arguments: Arguments,

    /// Total number of items matching the filter across all the pages.
    pub total: u64,
}

impl<I> Page<I> {
    /// Creates a new [`Page`].
    #[must_use]
    pub fn new(
        arguments: Arguments,
        items: impl IntoIterator<Item = impl Into<I>>,
        total: u64,
    ) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            arguments,
            total,
        }
    }

    /// Returns the total number of pages.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.arguments.limit()))
    }

    /// Maps items of this [`Page`].
    #[must_use]
    pub fn map<T>(self, f: impl FnMut(I) -> T) -> Page<T> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            arguments: self.arguments,
            total: self.total,
        }
    }
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($node:ty, $filter:ty) => {
        #[doc = "A [`Page`] of items."]
        pub type Page = $crate::pagination::Page<$node>;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments;

        #[doc = "[`Page`] selector."]
        pub type Selector = $crate::pagination::Selector<$filter>;
    };
}
