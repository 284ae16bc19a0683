mod test_camera_tracks_are_negotiated;
mod test_screen_share_is_labelled;
