//! Search and pagination for the attendance list

use gatepass_api::VisitorPass;
use serde::Serialize;

/// Passes whose name, pass id or host contains `term`, ignoring case.
///
/// A blank term matches everything. Order is preserved.
pub fn search<'a>(passes: &'a [VisitorPass], term: &str) -> Vec<&'a VisitorPass> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return passes.iter().collect();
    }

    passes
        .iter()
        .filter(|pass| {
            pass.full_name.to_lowercase().contains(&needle)
                || pass.pass_id.as_str().to_lowercase().contains(&needle)
                || pass.host_name.to_lowercase().contains(&needle)
        })
        .collect()
}

/// One page of a longer list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page actually shown
    pub page: usize,
    /// 0 when the list is empty
    pub total_pages: usize,
    /// Length of the whole list
    pub total: usize,
    pub rows_per_page: usize,
}

impl<T> Page<T> {
    /// 1-based position of the first item shown, 0 on an empty page
    pub fn first_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            self.last_index() - self.items.len() + 1
        }
    }

    /// 1-based position of the last item shown
    pub fn last_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.page - 1) * self.rows_per_page + self.items.len()
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Cut `items` into pages of `rows_per_page` and return page `page`.
///
/// Pages are 1-based. Out-of-range requests are clamped to the nearest page.
pub fn paginate<T>(items: Vec<T>, page: usize, rows_per_page: usize) -> Page<T> {
    let rows = rows_per_page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(rows);
    let page = page.clamp(1, total_pages.max(1));

    let items = items.into_iter().skip((page - 1) * rows).take(rows).collect();

    Page {
        items,
        page,
        total_pages,
        total,
        rows_per_page: rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<VisitorPass> {
        vec![
            VisitorPass::new("VIS-1001", "Asha Rao").with_host("Dr. Menon", "Seminar"),
            VisitorPass::new("VIS-1002", "Rahul Nair").with_host("Prof. Iyer", "Interview"),
            VisitorPass::new("VIS-2001", "Meera Das").with_host("Dr. Menon", "Lab visit"),
        ]
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let passes = roster();

        let names: Vec<_> = search(&passes, "MENON")
            .into_iter()
            .map(|p| p.full_name.as_str())
            .collect();
        assert_eq!(names, ["Asha Rao", "Meera Das"]);

        assert_eq!(search(&passes, "vis-100").len(), 2);
        assert_eq!(search(&passes, "rahul").len(), 1);
        assert!(search(&passes, "nobody").is_empty());
    }

    #[test]
    fn blank_search_matches_all() {
        let passes = roster();
        assert_eq!(search(&passes, "").len(), 3);
        assert_eq!(search(&passes, "   ").len(), 3);
    }

    #[test]
    fn pagination_splits_and_clamps() {
        let items: Vec<u32> = (1..=25).collect();

        let page = paginate(items.clone(), 1, 10);
        assert_eq!(page.items, (1..=10).collect::<Vec<_>>());
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next());
        assert!(!page.has_previous());

        let page = paginate(items.clone(), 3, 10);
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.first_index(), 21);
        assert_eq!(page.last_index(), 25);
        assert!(!page.has_next());

        let page = paginate(items.clone(), 99, 10);
        assert_eq!(page.page, 3);

        let page = paginate(items, 0, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.first_index(), 1);
        assert_eq!(page.last_index(), 10);
    }

    #[test]
    fn empty_list_has_no_pages() {
        let page = paginate(Vec::<u32>::new(), 4, 10);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.page, 1);
        assert!(page.items.is_empty());
        assert_eq!(page.first_index(), 0);
        assert!(!page.has_next());
    }
}
