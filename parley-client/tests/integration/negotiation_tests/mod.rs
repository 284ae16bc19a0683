mod test_peers_negotiate_through_relay;
