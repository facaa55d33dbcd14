//! Pipeline integration tests
//!
//! Drives the full collection pipeline over scripted `dspmq`/`runmqsc`
//! output shaped like a real installation's.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mq_exporter::collector::{CommandRunner, MqTask};
use mq_exporter::error::TransportError;
use mq_exporter::pipeline::{ManagerHealth, Pipeline, PipelineState};

const DSPMQ: &str = "\
QMNAME(TEST)                                              STATUS(Running)
QMNAME(IDLE)                                              STATUS(Ended immediately)
";

const TEST_STATUS: &str = "QMNAME(TEST)                                              \
STATUS(Running) DEFAULT(yes) STANDBY(Not permitted) INSTNAME(Installation1) \
INSTPATH(/opt/mqm) INSTVER(9.1.0.0)";

const IDLE_STATUS: &str = "QMNAME(IDLE)                                              \
STATUS(Ended immediately) DEFAULT(no) STANDBY(Not permitted) INSTNAME(Installation1) \
INSTPATH(/opt/mqm) INSTVER(9.1.0.0)";

const QUEUE_DEPTH: &str = "\
5724-H72 (C) Copyright IBM Corp. 1994, 2019.
Starting MQSC for queue manager TEST.


AMQ8409I: Display Queue details.
   QUEUE(SYSTEM.DEFAULT.LOCAL.QUEUE)       TYPE(QLOCAL)
   CURDEPTH(0)                             MAXDEPTH(5000)
One MQSC command read.
No commands have a syntax error.
All valid MQSC commands were processed.
";

const QUEUE_MONITOR: &str = "\
5724-H72 (C) Copyright IBM Corp. 1994, 2019.
Starting MQSC for queue manager TEST.


AMQ8450I: Display queue status details.
   QUEUE(DEV.QUEUE.1)                      TYPE(QUEUE)
   CURDEPTH(0)                             LGETDATE(2019-12-24)
   LGETTIME(13.00.01)                      LPUTDATE(2019-12-24)
   LPUTTIME(13.00.00)                      MEDIALOG( )
   MONQ(MEDIUM)                            MSGAGE(0)
   QTIME(3231, 3232)
One MQSC command read.
No commands have a syntax error.
All valid MQSC commands were processed.
";

/// Replays canned output and records every command issued
struct ScriptedRunner {
    depth: String,
    calls: Mutex<Vec<(MqTask, String)>>,
}

impl ScriptedRunner {
    fn new() -> Self {
        Self::with_depth(QUEUE_DEPTH)
    }

    fn with_depth(depth: &str) -> Self {
        Self {
            depth: depth.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls_for(&self, manager: &str) -> Vec<MqTask> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, m)| m == manager)
            .map(|(task, _)| *task)
            .collect()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, task: MqTask, manager: &str) -> Result<String, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((task, manager.to_string()));

        match (task, manager) {
            (MqTask::ListManagers, _) => Ok(DSPMQ.to_string()),
            (MqTask::ManagerStatus, "TEST") => Ok(TEST_STATUS.to_string()),
            (MqTask::ManagerStatus, "IDLE") => Ok(IDLE_STATUS.to_string()),
            (MqTask::QueueDepth, "TEST") => Ok(self.depth.clone()),
            (MqTask::QueueMonitor, "TEST") => Ok(QUEUE_MONITOR.to_string()),
            (_, other) => Err(TransportError::NonZeroExit {
                program: "runmqsc".to_string(),
                code: 72,
                stderr: format!("AMQ8118E: IBM MQ queue manager '{}' does not exist.", other),
            }),
        }
    }
}

#[tokio::test]
async fn test_running_manager_end_to_end() {
    let runner = Arc::new(ScriptedRunner::new());
    let outcome = Pipeline::new(runner.clone()).collect("TEST").await.unwrap();

    let expected = "\
# HELP mq_manager_status Current status of MQ manager.
# TYPE mq_manager_status gauge
mq_manager_status{default=\"yes\", instname=\"Installation1\", instpath=\"/opt/mqm\", instver=\"9.1.0.0\", qmname=\"TEST\", standby=\"Not permitted\"} 1
# HELP mq_queue_curdepth Current depth of queue.
# TYPE mq_queue_curdepth gauge
mq_queue_curdepth{qmname=\"TEST\", queuename=\"SYSTEM.DEFAULT.LOCAL.QUEUE\", type=\"QLOCAL\"} 0
# HELP mq_queue_maxdepth Maximum depth of queue.
# TYPE mq_queue_maxdepth gauge
mq_queue_maxdepth{qmname=\"TEST\", queuename=\"SYSTEM.DEFAULT.LOCAL.QUEUE\", type=\"QLOCAL\"} 5000
# HELP mq_queue_lget Timestamp on which the last message was retrieved from the queue.
# TYPE mq_queue_lget gauge
mq_queue_lget{qmname=\"TEST\", queuename=\"DEV.QUEUE.1\"} 1577192401
# HELP mq_queue_lput Timestamp on which the last message was put to the queue.
# TYPE mq_queue_lput gauge
mq_queue_lput{qmname=\"TEST\", queuename=\"DEV.QUEUE.1\"} 1577192400
# HELP mq_queue_msgage Age of the oldest message on the queue.
# TYPE mq_queue_msgage gauge
mq_queue_msgage{qmname=\"TEST\", queuename=\"DEV.QUEUE.1\"} 0
# HELP mq_queue_qtime Interval between messages being put on the queue and then being destructively read.
# TYPE mq_queue_qtime gauge
mq_queue_qtime{qmname=\"TEST\", queuename=\"DEV.QUEUE.1\", indicator=\"short_term\"} 3231
mq_queue_qtime{qmname=\"TEST\", queuename=\"DEV.QUEUE.1\", indicator=\"long_term\"} 3232
";

    assert_eq!(outcome.text, expected);
    assert_eq!(outcome.state, PipelineState::Done);
    assert_eq!(outcome.health, ManagerHealth::Running);
    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.samples, 8);
    assert_eq!(
        runner.calls_for("TEST"),
        vec![MqTask::ManagerStatus, MqTask::QueueDepth, MqTask::QueueMonitor]
    );
}

#[tokio::test]
async fn test_stopped_manager_never_queries_queues() {
    let runner = Arc::new(ScriptedRunner::new());
    let outcome = Pipeline::new(runner.clone()).collect("IDLE").await.unwrap();

    assert_eq!(outcome.state, PipelineState::Abort);
    assert_eq!(outcome.health, ManagerHealth::NotRunning);
    assert_eq!(
        outcome.text,
        "# HELP mq_manager_status Current status of MQ manager.\n\
         # TYPE mq_manager_status gauge\n\
         mq_manager_status{default=\"no\", instname=\"Installation1\", instpath=\"/opt/mqm\", \
         instver=\"9.1.0.0\", qmname=\"IDLE\", standby=\"Not permitted\"} 0\n"
    );
    assert_eq!(runner.calls_for("IDLE"), vec![MqTask::ManagerStatus]);
}

#[tokio::test]
async fn test_discovered_managers_collected_in_order() {
    let runner = Arc::new(ScriptedRunner::new());
    let pipeline = Pipeline::new(runner.clone());

    let managers = pipeline.managers(&[]).await.unwrap();
    assert_eq!(managers, vec!["TEST", "IDLE"]);

    let results = pipeline.collect_all(&managers).await;
    let names: Vec<&str> = results.iter().map(|(m, _)| m.as_str()).collect();
    assert_eq!(names, vec!["TEST", "IDLE"]);

    let test = results[0].1.as_ref().unwrap();
    let idle = results[1].1.as_ref().unwrap();
    assert_eq!(test.health, ManagerHealth::Running);
    assert_eq!(idle.health, ManagerHealth::NotRunning);
}

#[tokio::test]
async fn test_unknown_manager_fails_transport() {
    let runner = Arc::new(ScriptedRunner::new());
    let result = Pipeline::new(runner).collect("MISSING").await;

    assert!(matches!(
        result,
        Err(TransportError::NonZeroExit { code: 72, .. })
    ));
}

#[tokio::test]
async fn test_malformed_queue_skipped_others_kept() {
    let depth = QUEUE_DEPTH.replace(
        "One MQSC command read.",
        "AMQ8409I: Display Queue details.\n   QUEUE(BAD.QUEUE)    TYPE(QLOCAL)\n   \
         CURDEPTH(lots)      MAXDEPTH(5000)\nOne MQSC command read.",
    );
    let runner = Arc::new(ScriptedRunner::with_depth(&depth));
    let outcome = Pipeline::new(runner).collect("TEST").await.unwrap();

    assert_eq!(outcome.state, PipelineState::Done);
    assert!(outcome
        .text
        .contains("queuename=\"SYSTEM.DEFAULT.LOCAL.QUEUE\", type=\"QLOCAL\"} 5000\n"));
    assert!(!outcome.text.contains("BAD.QUEUE"));
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].entity, "BAD.QUEUE");
}
