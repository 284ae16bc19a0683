mod test_disconnect_notifies_every_room;
mod test_join_fans_out_to_existing_members;
