//! Per-session registry of prepared statements.

use std::collections::HashMap;

use crate::protocol::{ColumnDefinition, TypeId};
use crate::value::Value;

/// One prepared statement, owned by the session that prepared it. The id
/// is meaningless to any other session and dies with STMT_CLOSE.
#[derive(Debug)]
pub struct PreparedStatement {
    pub id: u32,
    pub sql: String,
    pub params: Vec<ColumnDefinition>,
    pub columns: Vec<ColumnDefinition>,
    /// Parameter types bound by the first execution; later executions may
    /// reuse them instead of resending.
    pub param_types: Option<Vec<(TypeId, bool)>>,
    /// Accumulated COM_STMT_SEND_LONG_DATA chunks, by parameter index.
    long_data: HashMap<u16, Vec<u8>>,
}

impl PreparedStatement {
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn has_long_data(&self, index: usize) -> bool {
        self.long_data.contains_key(&(index as u16))
    }

    pub fn append_long_data(&mut self, index: u16, data: &[u8]) {
        self.long_data.entry(index).or_default().extend_from_slice(data);
    }

    /// Overlay streamed data onto the decoded parameters, consuming the
    /// buffers; they never survive an execution.
    pub fn merge_long_data(&mut self, params: &mut [Value]) {
        for (index, data) in self.long_data.drain() {
            if let Some(slot) = params.get_mut(index as usize) {
                *slot = Value::Bytes(data);
            }
        }
    }

    /// STMT_RESET: discard streamed data, keep the statement.
    pub fn reset(&mut self) {
        self.long_data.clear();
    }
}

/// Statement-id allocation and lookup for one session. Ids start at 1 and
/// are never reused within a session.
#[derive(Debug)]
pub struct StatementRegistry {
    next_id: u32,
    statements: HashMap<u32, PreparedStatement>,
}

impl Default for StatementRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementRegistry {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            statements: HashMap::new(),
        }
    }

    pub fn insert(
        &mut self,
        sql: String,
        params: Vec<ColumnDefinition>,
        columns: Vec<ColumnDefinition>,
    ) -> &PreparedStatement {
        let id = self.next_id;
        self.next_id += 1;

        self.statements.entry(id).or_insert(PreparedStatement {
            id,
            sql,
            params,
            columns,
            param_types: None,
            long_data: HashMap::new(),
        })
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut PreparedStatement> {
        self.statements.get_mut(&id)
    }

    pub fn remove(&mut self, id: u32) -> Option<PreparedStatement> {
        self.statements.remove(&id)
    }

    /// Session teardown, RESET_CONNECTION, CHANGE_USER.
    pub fn clear(&mut self) {
        self.statements.clear();
    }
}
