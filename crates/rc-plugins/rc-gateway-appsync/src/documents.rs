//! GraphQL documents sent to the managed API.

pub const LIST_POSTS: &str = r#"
query ListPosts($limit: Int, $nextToken: String) {
  listPosts(limit: $limit, nextToken: $nextToken) {
    items {
      id
      owner
      title
      contents
      image
      createdAt
      votes {
        items { id postID owner vote }
        nextToken
      }
    }
    nextToken
  }
}
"#;

pub const GET_POST: &str = r#"
query GetPost($id: ID!) {
  getPost(id: $id) {
    id
    owner
    title
    contents
    image
    createdAt
    comments {
      items { id postID owner content createdAt }
      nextToken
    }
    votes {
      items { id postID owner vote }
      nextToken
    }
  }
}
"#;

pub const CREATE_POST: &str = r#"
mutation CreatePost($input: CreatePostInput!) {
  createPost(input: $input) {
    id
    owner
    title
    contents
    image
    createdAt
  }
}
"#;

pub const CREATE_COMMENT: &str = r#"
mutation CreateComment($input: CreateCommentInput!) {
  createComment(input: $input) {
    id
    postID
    owner
    content
    createdAt
  }
}
"#;

pub const CREATE_VOTE: &str = r#"
mutation CreateVote($input: CreateVoteInput!) {
  createVote(input: $input) { id postID owner vote }
}
"#;

pub const UPDATE_VOTE: &str = r#"
mutation UpdateVote($input: UpdateVoteInput!) {
  updateVote(input: $input) { id postID owner vote }
}
"#;
