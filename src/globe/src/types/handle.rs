/// Identifies one overlay or effect node for the lifetime of that node.
///
/// Handles are never reused, so a renderer can key its own resources on them
/// and drop those resources when the handle is reported as removed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeHandle(u64);

impl NodeHandle {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct HandleAllocator {
    next: u64,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> NodeHandle {
        let handle = NodeHandle(self.next);
        self.next += 1;
        handle
    }
}
