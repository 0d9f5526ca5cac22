//! Response-schema catalog for the Rundeck API
//!
//! Parse tables for every response shape the client consumes, authored once
//! as configuration on top of the [schema model](crate::schema). The engine
//! never looks at this module; callers pick a table (usually
//! [`Catalog::response`], the root alternative over every top-level shape)
//! and hand it to [`evaluate`](crate::engine::evaluate).
//!
//! Which lists validate their `count` attribute and which skip it follows the
//! service's actual behavior per tag; it is deliberately not uniform.

use std::sync::{Arc, OnceLock};

use crate::schema::Schema;

/// The parse tables for the Rundeck XML API, built once per process.
#[derive(Debug)]
pub struct Catalog {
    /// `<error><message>..</message></error>`
    pub error: Arc<Schema>,
    /// Attribute-only `<node name=".." .../>`
    pub node: Arc<Schema>,
    /// Uncounted `<options>` list of `<option>` bodies
    pub options: Arc<Schema>,
    /// Job summary as it appears in listings and executions
    pub job: Arc<Schema>,
    /// Counted `<jobs>` list of job summaries
    pub jobs: Arc<Schema>,
    /// A single `<execution>` with its optional node lists
    pub execution: Arc<Schema>,
    /// Counted `<executions>` list
    pub executions: Arc<Schema>,
    /// `<system>` info: timestamp, version, OS, JVM and stats blocks
    pub system_info: Arc<Schema>,
    /// Per-job outcome of a bulk delete: message body or error body
    pub delete_job_result: Arc<Schema>,
    /// `<deleteJobs>` with its succeeded/failed sublists
    pub delete_jobs: Arc<Schema>,
    /// The three workflow step shapes a `<command>` can take
    pub command: Arc<Schema>,
    /// Full job definition as exported in a `<joblist>`
    pub job_definition: Arc<Schema>,
    /// Uncounted `<joblist>` of job definitions
    pub joblist: Arc<Schema>,
    /// The `<result>` wrapper in each of its operation-dependent bodies
    pub result: Arc<Schema>,
    /// Root table: every top-level document shape the API produces
    pub response: Arc<Schema>,
}

impl Catalog {
    pub fn new() -> Self {
        let error = Schema::composite("error", [Schema::text("message")], []);

        let date_started = Schema::attribute_text("date-started", "time");
        let date_ended = Schema::attribute_text("date-ended", "time");

        let node = Schema::attribute("node");
        let successful_nodes = Schema::uncounted_list("successfulNodes", node.clone());
        let failed_nodes = Schema::uncounted_list("failedNodes", node.clone());

        let option = Schema::composite("option", [], [Schema::text("description")]);
        let options = Schema::uncounted_list("options", option);

        let job = Schema::composite(
            "job",
            [
                Schema::text("id"),
                Schema::text("name"),
                Schema::text("project"),
            ],
            [
                Schema::text("group"),
                Schema::text("description"),
                Schema::text("url"),
                options.clone(),
            ],
        );
        let jobs = Schema::list("jobs", job.clone());

        let execution = Schema::composite(
            "execution",
            [
                Schema::text("user"),
                date_started.clone(),
                Schema::text("description"),
            ],
            [
                job.clone(),
                Schema::text("argstring"),
                Schema::text("serverUUID"),
                Schema::text("abortedby"),
                date_ended.clone(),
                successful_nodes.clone(),
                failed_nodes.clone(),
            ],
        );
        let executions = Schema::list("executions", execution.clone());

        let succeeded_jobs = Schema::list("succeeded", job.clone());
        let failed_jobs = Schema::list("failed", job.clone());
        let skipped_jobs = Schema::list("skipped", job.clone());

        let success = Schema::composite("success", [Schema::text("message")], []);
        let timestamp = Schema::composite("timestamp", [Schema::text("datetime")], []);

        let rundeck_info = Schema::composite(
            "rundeck",
            [
                Schema::text("version"),
                Schema::text("build"),
                Schema::text("node"),
                Schema::text("base"),
                Schema::text("apiversion"),
                Schema::text("serverUUID"),
            ],
            [],
        );

        let os = Schema::composite(
            "os",
            [
                Schema::text("arch"),
                Schema::text("name"),
                Schema::text("version"),
            ],
            [],
        );

        let jvm = Schema::composite(
            "jvm",
            [
                Schema::text("name"),
                Schema::text("vendor"),
                Schema::text("version"),
                Schema::text("implementationVersion"),
            ],
            [],
        );

        let uptime = Schema::composite(
            "uptime",
            [Schema::composite(
                "since",
                [Schema::text("datetime")],
                [],
            )],
            [],
        );
        let cpu = Schema::composite(
            "cpu",
            [
                Schema::attribute_text("loadAverage", "load"),
                Schema::text("processors"),
            ],
            [],
        );
        let memory = Schema::composite(
            "memory",
            [
                Schema::text("max"),
                Schema::text("free"),
                Schema::text("total"),
            ],
            [],
        );
        let scheduler = Schema::composite("scheduler", [Schema::text("running")], []);
        let threads = Schema::composite("threads", [Schema::text("active")], []);

        let stats = Schema::composite(
            "stats",
            [uptime, cpu, memory, scheduler, threads],
            [],
        );

        let system_info = Schema::composite(
            "system",
            [
                timestamp,
                rundeck_info,
                os,
                jvm,
                stats,
                Schema::attribute("metrics"),
                Schema::attribute("threadDump"),
            ],
            [],
        );

        let delete_job_result = Schema::alternatives([
            Schema::composite("deleteJobResult", [Schema::text("message")], []),
            Schema::composite("deleteJobResult", [Schema::text("error")], []),
        ]);

        let delete_jobs = Schema::composite(
            "deleteJobs",
            [],
            [
                Schema::list("succeeded", delete_job_result.clone()),
                Schema::list("failed", delete_job_result.clone()),
            ],
        );

        let result = Schema::alternatives([
            Schema::composite("result", [jobs.clone()], []),
            Schema::composite("result", [error.clone()], []),
            Schema::composite("result", [executions.clone()], []),
            Schema::composite(
                "result",
                [succeeded_jobs, failed_jobs, skipped_jobs],
                [],
            ),
            Schema::composite("result", [success, system_info.clone()], []),
            Schema::composite("result", [delete_jobs.clone()], []),
        ]);

        let simple_command = Schema::composite("command", [Schema::text("exec")], []);
        let script_command = Schema::composite(
            "command",
            [],
            [
                Schema::text("script"),
                Schema::text("scriptargs"),
                Schema::text("scripturl"),
                Schema::composite(
                    "errorhandler",
                    [],
                    [
                        Schema::text("exec"),
                        Schema::text("scriptargs"),
                        Schema::text("scripturl"),
                    ],
                ),
            ],
        );
        let jobref_command = Schema::composite(
            "command",
            [Schema::composite(
                "jobref",
                [],
                [Schema::attribute("arg")],
            )],
            [],
        );
        let command = Schema::alternatives([simple_command, script_command, jobref_command]);

        let job_definition = Schema::composite(
            "job",
            [
                Schema::text("id"),
                Schema::text("loglevel"),
                Schema::composite("sequence", [command.clone()], []),
                Schema::text("name"),
                Schema::text("uuid"),
                Schema::composite(
                    "context",
                    [Schema::text("project")],
                    [options.clone()],
                ),
            ],
            [
                Schema::text("description"),
                Schema::text("group"),
                Schema::composite(
                    "dispatch",
                    [],
                    [
                        Schema::text("threadcount"),
                        Schema::text("keepgoing"),
                        Schema::text("excludePrecedence"),
                        Schema::text("rankOrder"),
                    ],
                ),
                Schema::uncounted_list("nodefilters", Schema::text("filter")),
                Schema::text("multipleExecutions"),
                Schema::composite(
                    "schedule",
                    [],
                    [
                        Schema::attribute("time"),
                        Schema::attribute("weekday"),
                        Schema::attribute("month"),
                        Schema::attribute("year"),
                    ],
                ),
                Schema::composite(
                    "notification",
                    [],
                    [
                        Schema::composite(
                            "onfailure",
                            [],
                            [Schema::attribute("email")],
                        ),
                        Schema::composite(
                            "onsuccess",
                            [],
                            [Schema::attribute("email")],
                        ),
                    ],
                ),
            ],
        );
        let joblist = Schema::uncounted_list("joblist", job_definition.clone());

        let response = Schema::alternatives([result.clone(), joblist.clone()]);

        Self {
            error,
            node,
            options,
            job,
            jobs,
            execution,
            executions,
            system_info,
            delete_job_result,
            delete_jobs,
            command,
            job_definition,
            joblist,
            result,
            response,
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide catalog, built on first use.
pub fn catalog() -> &'static Catalog {
    static CATALOG: OnceLock<Catalog> = OnceLock::new();
    CATALOG.get_or_init(Catalog::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_shared() {
        let first = catalog();
        let second = catalog();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_root_table_covers_both_document_shapes() {
        let root = &catalog().response;
        assert!(root.matches_tag("result"));
        assert!(root.matches_tag("joblist"));
        assert!(!root.matches_tag("jobs"));
    }

    #[test]
    fn test_node_table_is_shared_between_node_lists() {
        let cat = catalog();
        let element_of = |schema: &Arc<Schema>| match schema.as_ref() {
            Schema::List { element, .. } => element.clone(),
            other => panic!("expected list, got {other:?}"),
        };

        let execution_lists: Vec<_> = match cat.execution.as_ref() {
            Schema::Composite { optional, .. } => optional
                .iter()
                .filter(|schema| matches!(schema.as_ref(), Schema::List { .. }))
                .collect(),
            other => panic!("expected composite, got {other:?}"),
        };
        assert_eq!(execution_lists.len(), 2);
        assert!(Arc::ptr_eq(
            &element_of(execution_lists[0]),
            &element_of(execution_lists[1])
        ));
        assert!(Arc::ptr_eq(&element_of(execution_lists[0]), &cat.node));
    }

    #[test]
    fn test_count_validation_asymmetry_preserved() {
        let cat = catalog();
        assert!(matches!(
            cat.jobs.as_ref(),
            Schema::List {
                skip_count: false,
                ..
            }
        ));
        assert!(matches!(
            cat.executions.as_ref(),
            Schema::List {
                skip_count: false,
                ..
            }
        ));
        assert!(matches!(
            cat.options.as_ref(),
            Schema::List {
                skip_count: true,
                ..
            }
        ));
        assert!(matches!(
            cat.joblist.as_ref(),
            Schema::List {
                skip_count: true,
                ..
            }
        ));
    }
}
