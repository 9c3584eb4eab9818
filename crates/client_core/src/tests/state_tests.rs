use super::*;
use crate::{dispatcher::DispatcherSet, transport::MessageTransport};
use async_trait::async_trait;
use shared::protocol::SendMessageRequest;
use std::{collections::VecDeque, sync::Arc};
use tokio::sync::{mpsc, oneshot, Mutex};
use url::Url;

fn rejected(detail: Option<&str>) -> DispatchError {
    DispatchError::RejectedByServer {
        endpoint: "http://127.0.0.1:5000/send_message_user1".to_string(),
        status_code: 400,
        detail: detail.map(str::to_string),
    }
}

fn offline() -> DispatchError {
    DispatchError::network("http://127.0.0.1:5000/receive_messages_user1", "request timed out")
}

fn inbox(messages: &[&str]) -> Vec<String> {
    messages.iter().map(|m| m.to_string()).collect()
}

fn exchange() -> ExchangeState {
    ExchangeState::new(&Settings::default())
}

#[test]
fn successful_send_clears_draft_and_acknowledges() {
    let mut state = exchange();
    let panel = state.panel_mut(UserSlot::User1);
    panel.edit_draft("hello");

    let (ticket, message) = panel.begin_send();
    assert_eq!(message, "hello");
    assert_eq!(panel.draft(), "hello");

    assert_eq!(panel.apply_send(ticket, Ok(())), Reduction::Applied);
    assert_eq!(panel.draft(), "");
    assert!(panel.error().is_none());
    assert_eq!(
        panel.acknowledgement(),
        Some("Message sent from User 1 to User 2!")
    );

    panel.dismiss_acknowledgement();
    assert!(panel.acknowledgement().is_none());
}

#[test]
fn rejected_send_keeps_draft_and_reports_status() {
    let mut state = exchange();
    let panel = state.panel_mut(UserSlot::User1);
    panel.edit_draft("bad word");

    let (ticket, _) = panel.begin_send();
    panel.apply_send(ticket, Err(rejected(Some("unsafe content"))));

    assert_eq!(panel.draft(), "bad word");
    let error = panel.error().expect("error");
    assert!(error.message().contains("unsafe content"));
    assert_eq!(error.kind(), DispatchErrorKind::RejectedByServer);
    assert_eq!(error.operation(), Operation::Send);
    assert!(panel.acknowledgement().is_none());
}

#[test]
fn send_failure_without_status_uses_generic_message() {
    let mut state = exchange();

    let panel = state.panel_mut(UserSlot::User2);
    let (ticket, _) = panel.begin_send();
    panel.apply_send(ticket, Err(rejected(None)));
    assert_eq!(
        panel.error().map(OperationError::message),
        Some("Failed to send message from User 2.")
    );

    let (ticket, _) = panel.begin_send();
    panel.apply_send(ticket, Err(offline()));
    let error = panel.error().expect("error");
    assert_eq!(error.message(), "Failed to send message from User 2.");
    assert_eq!(error.kind(), DispatchErrorKind::NetworkUnavailable);
}

#[test]
fn receive_replaces_inbox_instead_of_merging() {
    let mut state = exchange();
    let panel = state.panel_mut(UserSlot::User2);

    let ticket = panel.begin_receive();
    panel.apply_receive(ticket, Ok(inbox(&["hi", "yo"])));
    assert_eq!(panel.inbox(), inbox(&["hi", "yo"]).as_slice());

    let ticket = panel.begin_receive();
    panel.apply_receive(ticket, Ok(inbox(&["later"])));
    assert_eq!(panel.inbox(), inbox(&["later"]).as_slice());

    let ticket = panel.begin_receive();
    panel.apply_receive(ticket, Ok(Vec::new()));
    assert!(panel.inbox().is_empty());
    assert!(panel.error().is_none());
}

#[test]
fn failed_receive_keeps_previous_inbox() {
    let mut state = exchange();
    let panel = state.panel_mut(UserSlot::User1);

    let ticket = panel.begin_receive();
    panel.apply_receive(ticket, Ok(inbox(&["kept"])));

    let ticket = panel.begin_receive();
    panel.apply_receive(ticket, Err(offline()));
    assert_eq!(panel.inbox(), inbox(&["kept"]).as_slice());
    assert_eq!(
        panel.error().map(OperationError::message),
        Some("Error retrieving messages for User 1.")
    );

    let ticket = panel.begin_receive();
    panel.apply_receive(ticket, Err(rejected(Some("storage offline"))));
    let error = panel.error().expect("error");
    assert_eq!(error.message(), "Failed to retrieve messages for User 1.");
    assert_eq!(error.cause().server_detail(), Some("storage offline"));
    assert_eq!(panel.inbox(), inbox(&["kept"]).as_slice());
}

#[test]
fn any_success_clears_previous_error() {
    let mut state = exchange();
    let panel = state.panel_mut(UserSlot::User1);

    let (ticket, _) = panel.begin_send();
    panel.apply_send(ticket, Err(offline()));
    assert!(panel.error().is_some());
    let ticket = panel.begin_receive();
    panel.apply_receive(ticket, Ok(Vec::new()));
    assert!(panel.error().is_none());

    let ticket = panel.begin_receive();
    panel.apply_receive(ticket, Err(offline()));
    assert!(panel.error().is_some());
    let (ticket, _) = panel.begin_send();
    panel.apply_send(ticket, Ok(()));
    assert!(panel.error().is_none());
}

#[test]
fn stale_receive_arriving_last_is_dropped() {
    let mut state = exchange();
    let panel = state.panel_mut(UserSlot::User1);

    let first = panel.begin_receive();
    let second = panel.begin_receive();
    assert_eq!(panel.receives_in_flight(), 2);

    assert_eq!(
        panel.apply_receive(second, Ok(inbox(&["new"]))),
        Reduction::Applied
    );
    assert_eq!(
        panel.apply_receive(first, Ok(inbox(&["old"]))),
        Reduction::Stale
    );
    assert_eq!(panel.inbox(), inbox(&["new"]).as_slice());
    assert_eq!(panel.receives_in_flight(), 0);
}

#[test]
fn receives_arriving_in_issue_order_both_apply() {
    let mut state = exchange();
    let panel = state.panel_mut(UserSlot::User1);

    let first = panel.begin_receive();
    let second = panel.begin_receive();
    assert_eq!(
        panel.apply_receive(first, Ok(inbox(&["old"]))),
        Reduction::Applied
    );
    assert_eq!(
        panel.apply_receive(second, Ok(inbox(&["new"]))),
        Reduction::Applied
    );
    assert_eq!(panel.inbox(), inbox(&["new"]).as_slice());
}

#[test]
fn stale_receive_failure_does_not_raise_error() {
    let mut state = exchange();
    let panel = state.panel_mut(UserSlot::User2);

    let first = panel.begin_receive();
    let second = panel.begin_receive();
    panel.apply_receive(second, Ok(inbox(&["fresh"])));
    assert_eq!(panel.apply_receive(first, Err(offline())), Reduction::Stale);
    assert!(panel.error().is_none());
}

#[test]
fn every_send_completion_is_reduced() {
    let mut state = exchange();
    let panel = state.panel_mut(UserSlot::User1);
    panel.edit_draft("one");
    let (first, _) = panel.begin_send();
    let (second, _) = panel.begin_send();
    assert_eq!(panel.sends_in_flight(), 2);

    panel.apply_send(second, Ok(()));
    assert_eq!(panel.apply_send(first, Err(offline())), Reduction::Applied);
    assert_eq!(panel.draft(), "");
    assert!(panel.error().is_some());
    assert_eq!(panel.sends_in_flight(), 0);
}

#[test]
fn ticket_from_other_user_is_rejected() {
    let mut state = exchange();
    state.panel_mut(UserSlot::User2).edit_draft("draft b");
    let foreign = state.panel_mut(UserSlot::User1).begin_receive();

    let user2 = state.panel_mut(UserSlot::User2);
    assert_eq!(
        user2.apply_receive(foreign, Ok(inbox(&["leak"]))),
        Reduction::Rejected
    );
    assert!(user2.inbox().is_empty());
    assert_eq!(user2.draft(), "draft b");
}

#[test]
fn ticket_for_other_operation_is_rejected() {
    let mut state = exchange();
    let panel = state.panel_mut(UserSlot::User1);
    let receive = panel.begin_receive();
    panel.edit_draft("keep");
    assert_eq!(panel.apply_send(receive, Ok(())), Reduction::Rejected);
    assert_eq!(panel.draft(), "keep");
}

#[test]
fn abandoned_request_surfaces_as_users_error() {
    let mut state = exchange();
    let panel = state.panel_mut(UserSlot::User1);
    panel.edit_draft("queued");
    let (ticket, _) = panel.begin_send();

    panel.abandon(ticket, DispatchError::network("command queue", "closed"));
    assert_eq!(panel.draft(), "queued");
    assert_eq!(panel.sends_in_flight(), 0);
    assert_eq!(
        panel.error().map(OperationError::kind),
        Some(DispatchErrorKind::NetworkUnavailable)
    );
}

#[test]
fn abandoned_receive_does_not_shadow_earlier_backend_reply() {
    let mut state = exchange();
    let panel = state.panel_mut(UserSlot::User1);
    let dispatched = panel.begin_receive();
    let never_queued = panel.begin_receive();

    panel.abandon(never_queued, DispatchError::network("command queue", "full"));
    assert_eq!(panel.receives_in_flight(), 1);
    assert_eq!(
        panel.error().map(OperationError::message),
        Some("Error retrieving messages for User 1.")
    );

    let reduction = panel.apply_receive(dispatched, Ok(inbox(&["real"])));
    assert_eq!(reduction, Reduction::Applied);
    assert_eq!(panel.inbox(), ["real"]);
    assert!(panel.error().is_none());
    assert_eq!(panel.receives_in_flight(), 0);
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Edit(UserSlot),
    SendOk(UserSlot),
    SendFail(UserSlot),
    ReceiveOk(UserSlot),
    ReceiveFail(UserSlot),
}

impl Step {
    fn slot(self) -> UserSlot {
        match self {
            Step::Edit(slot)
            | Step::SendOk(slot)
            | Step::SendFail(slot)
            | Step::ReceiveOk(slot)
            | Step::ReceiveFail(slot) => slot,
        }
    }
}

fn snapshot(panel: &UserPanelState) -> (String, Vec<String>, Option<OperationError>) {
    (
        panel.draft().to_string(),
        panel.inbox().to_vec(),
        panel.error().cloned(),
    )
}

#[test]
fn operations_never_touch_the_other_user() {
    use UserSlot::{User1, User2};
    let steps = [
        Step::Edit(User1),
        Step::Edit(User2),
        Step::ReceiveOk(User1),
        Step::SendFail(User2),
        Step::SendOk(User1),
        Step::ReceiveFail(User1),
        Step::ReceiveOk(User2),
        Step::SendOk(User2),
        Step::SendFail(User1),
        Step::ReceiveFail(User2),
    ];

    // Every rotation gives a different interleaving of the two users.
    for rotation in 0..steps.len() {
        let mut state = exchange();
        for (n, step) in steps.iter().cycle().skip(rotation).take(steps.len()).enumerate() {
            let other = step.slot().peer();
            let before = snapshot(state.panel(other));

            let panel = state.panel_mut(step.slot());
            match *step {
                Step::Edit(_) => panel.edit_draft(format!("draft {n}")),
                Step::SendOk(_) => {
                    let (ticket, _) = panel.begin_send();
                    panel.apply_send(ticket, Ok(()));
                }
                Step::SendFail(_) => {
                    let (ticket, _) = panel.begin_send();
                    panel.apply_send(ticket, Err(rejected(Some("unsafe content"))));
                }
                Step::ReceiveOk(_) => {
                    let ticket = panel.begin_receive();
                    panel.apply_receive(ticket, Ok(vec![format!("msg {n}")]));
                }
                Step::ReceiveFail(_) => {
                    let ticket = panel.begin_receive();
                    panel.apply_receive(ticket, Err(offline()));
                }
            }

            assert_eq!(snapshot(state.panel(other)), before, "step {step:?}");
        }
    }
}

type InboxResult = Result<Vec<String>, DispatchError>;

/// Hands each inbox fetch the next gate; the fetch completes when the test
/// releases that gate.
struct GatedTransport {
    gates: Mutex<VecDeque<oneshot::Receiver<InboxResult>>>,
}

#[async_trait]
impl MessageTransport for GatedTransport {
    async fn post_message(
        &self,
        _url: &Url,
        _request: &SendMessageRequest,
    ) -> Result<(), DispatchError> {
        Ok(())
    }

    async fn fetch_inbox(&self, _url: &Url) -> InboxResult {
        let gate = self.gates.lock().await.pop_front().expect("gate available");
        gate.await.expect("gate released")
    }
}

#[tokio::test]
async fn overlapping_receives_settle_on_newest_request() {
    let (release_first, first_gate) = oneshot::channel();
    let (release_second, second_gate) = oneshot::channel();
    let transport = Arc::new(GatedTransport {
        gates: Mutex::new(VecDeque::from([first_gate, second_gate])),
    });
    let settings = Settings::default();
    let dispatchers = DispatcherSet::with_transport(&settings, transport).expect("dispatchers");
    let dispatcher = dispatchers.get(UserSlot::User1).clone();

    let mut state = ExchangeState::new(&settings);
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();

    let issue = |state: &mut ExchangeState| {
        let ticket = state.panel_mut(UserSlot::User1).begin_receive();
        let dispatcher = dispatcher.clone();
        let done_tx = done_tx.clone();
        tokio::spawn(async move {
            let result = dispatcher.receive().await;
            let _ = done_tx.send((ticket, result));
        })
    };
    let first = issue(&mut state);
    tokio::task::yield_now().await;
    let second = issue(&mut state);
    tokio::task::yield_now().await;

    // The newer request answers first; the older one straggles in after it.
    release_second
        .send(Ok(inbox(&["newest"])))
        .expect("release second");
    let (ticket, result) = done_rx.recv().await.expect("second done");
    assert_eq!(
        state.panel_mut(ticket.slot()).apply_receive(ticket, result),
        Reduction::Applied
    );

    release_first
        .send(Ok(inbox(&["outdated"])))
        .expect("release first");
    let (ticket, result) = done_rx.recv().await.expect("first done");
    assert_eq!(
        state.panel_mut(ticket.slot()).apply_receive(ticket, result),
        Reduction::Stale
    );

    first.await.expect("join");
    second.await.expect("join");
    assert_eq!(
        state.panel(UserSlot::User1).inbox(),
        inbox(&["newest"]).as_slice()
    );
    assert!(state.panel(UserSlot::User2).inbox().is_empty());
}
