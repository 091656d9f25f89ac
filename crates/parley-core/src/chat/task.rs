/// Identifies one asynchronous round trip issued by the reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Default)]
pub struct TaskSeq {
    next: u64,
}

impl TaskSeq {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Tracks the one active task of a given kind.
///
/// Completions are accepted only while their id is still the active one;
/// anything else is a stale result from a superseded request.
#[derive(Debug, Default, Clone)]
pub struct TaskState {
    active: Option<TaskId>,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<TaskId> {
        self.active
    }

    pub fn start(&mut self, seq: &mut TaskSeq) -> TaskId {
        let id = seq.next_id();
        self.active = Some(id);
        id
    }

    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.active = None;
        }
        ok
    }

    pub fn clear(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_only_accepts_active_id() {
        let mut seq = TaskSeq::default();
        let mut state = TaskState::default();

        let first = state.start(&mut seq);
        let second = state.start(&mut seq);

        assert!(!state.finish_if_active(first));
        assert!(state.is_running());
        assert!(state.finish_if_active(second));
        assert!(!state.is_running());
    }
}
