use crate::{
    entity::EntityKind,
    error::{PortalError, Result},
    portal::{
        Backend,
        csrf::CsrfToken,
        query::{ListQuery, Pagination, QueryResponse},
    },
};
use serde_json::Value;
use std::sync::{Mutex, PoisonError};
use tokio::sync::oneshot;

/// A request seen by [`MemoryBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Call {
    pub method: &'static str,
    pub kind: EntityKind,
    pub id: Option<String>,
    pub csrf: Option<String>,
}

/// Single-collection in-memory backend used by the controller tests
#[derive(Default)]
pub(crate) struct MemoryBackend {
    records: Mutex<Vec<Value>>,
    calls: Mutex<Vec<Call>>,
    fail_next: Mutex<Option<PortalError>>,
    delete_gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl MemoryBackend {
    pub fn with_records(records: Vec<Value>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    /// Make the next request fail with the given error
    pub fn fail_next(&self, err: PortalError) {
        *self.fail_next.lock().unwrap_or_else(PoisonError::into_inner) = Some(err);
    }

    /// Hold the next delete until the returned sender fires
    pub fn hold_next_delete(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.delete_gate.lock().unwrap_or_else(PoisonError::into_inner) = Some(rx);
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls().iter().filter(|c| c.method == method).count()
    }

    pub fn records(&self) -> Vec<Value> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record_call(
        &self,
        method: &'static str,
        kind: EntityKind,
        id: Option<&str>,
        csrf: Option<&CsrfToken>,
    ) -> Result<()> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Call {
                method,
                kind,
                id: id.map(str::to_string),
                csrf: csrf.map(|token| token.as_str().to_string()),
            });

        match self
            .fail_next
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records()
            .iter()
            .position(|record| record.get("id").and_then(Value::as_str) == Some(id))
    }
}

impl Backend for MemoryBackend {
    async fn get(&self, kind: EntityKind, id: &str) -> Result<Value> {
        self.record_call("get", kind, Some(id), None)?;

        self.position(id)
            .map(|index| self.records()[index].clone())
            .ok_or_else(|| PortalError::NotFound {
                entity: kind.collection().to_string(),
                id: id.to_string(),
            })
    }

    async fn query(&self, kind: EntityKind, query: &ListQuery) -> Result<QueryResponse> {
        self.record_call("query", kind, None, None)?;
        let data = self.records();

        Ok(QueryResponse {
            pagination: Pagination {
                page: query.page,
                page_size: query.page_size,
                total_count: Some(data.len() as u64),
                ..Default::default()
            },
            data,
        })
    }

    async fn upsert(&self, kind: EntityKind, body: &Value, csrf: &CsrfToken) -> Result<()> {
        let id = body.get("id").and_then(Value::as_str);
        self.record_call("upsert", kind, id, Some(csrf))?;

        let index = id.and_then(|id| self.position(id));
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        match index {
            Some(index) => records[index] = body.clone(),
            None => records.push(body.clone()),
        }

        Ok(())
    }

    async fn delete(&self, kind: EntityKind, id: &str, csrf: &CsrfToken) -> Result<()> {
        self.record_call("delete", kind, Some(id), Some(csrf))?;

        let gate = self
            .delete_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let index = self.position(id).ok_or_else(|| PortalError::NotFound {
            entity: kind.collection().to_string(),
            id: id.to_string(),
        })?;
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(index);

        Ok(())
    }
}
