/// Handshake progress of one peer link.
///
/// Caller side: `Idle -> Offering -> AwaitingAnswer -> Connected`.
/// Callee side: `Idle -> ReceivedOffer -> Answering -> Connected`.
/// Any state may move to `Closed`; nothing leaves `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NegotiationState {
    Idle,
    Offering,
    AwaitingAnswer,
    ReceivedOffer,
    Answering,
    /// The offer/answer handshake is complete. Media may still be starting.
    Connected,
    Closed,
}

impl NegotiationState {
    pub fn can_transition(self, to: NegotiationState) -> bool {
        use NegotiationState::*;

        match (self, to) {
            (Closed, _) => false,
            (_, Closed) => true,
            (Idle, Offering) | (Offering, AwaitingAnswer) | (AwaitingAnswer, Connected) => true,
            (Idle, ReceivedOffer) | (ReceivedOffer, Answering) | (Answering, Connected) => true,
            _ => false,
        }
    }

    /// Remote ICE candidates may be applied or buffered in this state.
    pub fn accepts_candidates(self) -> bool {
        !matches!(self, NegotiationState::Idle | NegotiationState::Closed)
    }
}
