/// First manager, in the order given, whose team is still below `capacity`.
pub fn pick_manager(team_sizes: &[(u64, i64)], capacity: i64) -> Option<u64> {
    team_sizes
        .iter()
        .find(|(_, size)| *size < capacity)
        .map(|(manager_id, _)| *manager_id)
}
