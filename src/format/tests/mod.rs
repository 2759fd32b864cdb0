//! Tests for the editor's file formats.
