use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Catalog,
    Cart,
}

/// Issued when a request starts; only the newest ticket per resource may
/// apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    resource: Resource,
    generation: u64,
}

impl Ticket {
    pub fn resource(&self) -> Resource {
        self.resource
    }
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    catalog: AtomicU64,
    cart: AtomicU64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, resource: Resource) -> Ticket {
        let generation = self.counter(resource).fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            resource,
            generation,
        }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.counter(ticket.resource).load(Ordering::SeqCst) == ticket.generation
    }

    /// Makes every outstanding ticket stale, e.g. on logout.
    pub fn invalidate_all(&self) {
        self.catalog.fetch_add(1, Ordering::SeqCst);
        self.cart.fetch_add(1, Ordering::SeqCst);
    }

    fn counter(&self, resource: Resource) -> &AtomicU64 {
        match resource {
            Resource::Catalog => &self.catalog,
            Resource::Cart => &self.cart,
        }
    }
}
