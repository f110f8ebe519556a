//! Process memory channel round trips.

mod traced_child;
