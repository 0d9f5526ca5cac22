//! Typed endpoint methods over the v1 API paths
//!
//! Each method issues the request, verifies the transport status, and
//! returns the evaluated native value. Operations that legitimately answer
//! with an empty body return `Option<Value>`.

use reqwest::StatusCode;

use rundeck_parse::Value;

use crate::{ClientError, Result, RundeckClient};

impl RundeckClient {
    /// Server version, OS, JVM and scheduler statistics.
    pub fn system_info(&self) -> Result<Value> {
        self.fetch("api/1/system/info", &[])
    }

    /// Jobs defined in a project.
    pub fn list_jobs(&self, project: &str) -> Result<Value> {
        self.fetch("api/1/jobs", &[("project", project)])
    }

    /// Trigger a job, optionally with an argument string.
    pub fn run_job(&self, job_id: &str, argstring: Option<&str>) -> Result<Value> {
        let path = format!("api/1/job/{job_id}/run");
        let mut params = Vec::new();
        if let Some(argstring) = argstring {
            params.push(("argString", argstring));
        }
        self.fetch(&path, &params)
    }

    /// A single execution by id.
    pub fn execution(&self, execution_id: &str) -> Result<Value> {
        self.fetch(&format!("api/1/execution/{execution_id}"), &[])
    }

    /// Past executions of a job.
    pub fn job_executions(&self, job_id: &str) -> Result<Value> {
        self.fetch(&format!("api/1/job/{job_id}/executions"), &[])
    }

    /// Currently running executions in a project.
    pub fn running_executions(&self, project: &str) -> Result<Value> {
        self.fetch("api/1/executions/running", &[("project", project)])
    }

    /// Upload a job definition document. The server answers with the
    /// succeeded/failed/skipped outcome lists.
    pub fn import_job(&self, definition: &str) -> Result<Value> {
        let (status, body) = self.post("api/1/jobs/import", &[("xmlBatch", definition)])?;
        self.expect_body("api/1/jobs/import", status, body)
    }

    /// Delete a job. The server may answer 204 with no body.
    pub fn delete_job(&self, job_id: &str) -> Result<Option<Value>> {
        let path = format!("api/1/job/{job_id}");
        let (status, body) = self.delete(&path, &[])?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(ClientError::UnexpectedStatus {
                endpoint: path,
                status,
            })
        }
    }

    fn fetch(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        let (status, body) = self.get(path, params)?;
        self.expect_body(path, status, body)
    }

    fn expect_body(
        &self,
        endpoint: &str,
        status: StatusCode,
        body: Option<Value>,
    ) -> Result<Value> {
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                endpoint: endpoint.to_string(),
                status,
            });
        }
        body.ok_or_else(|| ClientError::EmptyBody {
            endpoint: endpoint.to_string(),
        })
    }
}
