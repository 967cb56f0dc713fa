//! Paginated windows
//!
//! A [`Page`] is what list views hand to the emitter when they paginate. The
//! emitter only ever emits `object_list`; the surrounding numbers are there
//! for templates and headers.

/// Errors raised when slicing a collection into pages
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
	#[error("Invalid page: {0}")]
	InvalidPage(String),
	#[error("Page size must be greater than zero")]
	ZeroPageSize,
}

/// One page of a paginated collection
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
	/// Items in this page
	pub object_list: Vec<T>,
	/// Current page number (1-indexed)
	pub number: usize,
	/// Total number of pages
	pub num_pages: usize,
	/// Total number of items across all pages
	pub count: usize,
	/// Items per page
	pub page_size: usize,
}

impl<T> Page<T> {
	/// # Examples
	///
	/// ```
	/// use dynamic_response_core::pagination::Page;
	///
	/// let page = Page::new(vec!["a", "b", "c"], 1, 10, 30, 3);
	/// assert_eq!(page.number, 1);
	/// assert_eq!(page.num_pages, 10);
	/// assert_eq!(page.len(), 3);
	/// ```
	pub fn new(
		object_list: Vec<T>,
		number: usize,
		num_pages: usize,
		count: usize,
		page_size: usize,
	) -> Self {
		Self {
			object_list,
			number,
			num_pages,
			count,
			page_size,
		}
	}

	/// Slice `items` into the window for `number` (1-indexed)
	///
	/// An empty collection still has one (empty) first page.
	///
	/// # Examples
	///
	/// ```
	/// use dynamic_response_core::pagination::Page;
	///
	/// let page = Page::paginate((1..=7).collect(), 3, 3).unwrap();
	/// assert_eq!(page.object_list, vec![7]);
	/// assert_eq!(page.num_pages, 3);
	/// assert!(Page::paginate(vec![1, 2], 4, 2).is_err());
	/// ```
	pub fn paginate(
		items: Vec<T>,
		page_size: usize,
		number: usize,
	) -> Result<Self, PaginationError> {
		if page_size == 0 {
			return Err(PaginationError::ZeroPageSize);
		}
		let count = items.len();
		let num_pages = count.div_ceil(page_size).max(1);
		if number == 0 || number > num_pages {
			return Err(PaginationError::InvalidPage(format!(
				"page {} is outside 1..={}",
				number, num_pages
			)));
		}

		let start = (number - 1) * page_size;
		let object_list = items.into_iter().skip(start).take(page_size).collect();
		Ok(Self::new(object_list, number, num_pages, count, page_size))
	}

	/// Returns the 1-based index of the first item on this page
	pub fn start_index(&self) -> usize {
		if self.object_list.is_empty() {
			0
		} else {
			self.number.saturating_sub(1) * self.page_size + 1
		}
	}

	/// Returns the 1-based index of the last item on this page
	pub fn end_index(&self) -> usize {
		if self.object_list.is_empty() {
			0
		} else {
			self.start_index() + self.object_list.len() - 1
		}
	}

	pub fn has_next(&self) -> bool {
		self.number < self.num_pages
	}

	pub fn has_previous(&self) -> bool {
		self.number > 1
	}

	pub fn has_other_pages(&self) -> bool {
		self.has_previous() || self.has_next()
	}

	pub fn len(&self) -> usize {
		self.object_list.len()
	}

	pub fn is_empty(&self) -> bool {
		self.object_list.is_empty()
	}

	/// Convert every item, keeping the window numbers
	pub fn map_items<U, F>(self, f: F) -> Page<U>
	where
		F: FnMut(T) -> U,
	{
		Page {
			object_list: self.object_list.into_iter().map(f).collect(),
			number: self.number,
			num_pages: self.num_pages,
			count: self.count,
			page_size: self.page_size,
		}
	}
}
